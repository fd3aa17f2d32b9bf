//! Torrust Seeder application.
//!
//! The application is a container for the jobs. It starts:
//!
//! - One seeding job per configured source.
//! - The stats flush job.
//! - The health monitor job.
//!
//! and then waits for the shutdown. Once it is triggered every job observes
//! it and returns; the application waits until all of them have finished.
use std::sync::Arc;

use tokio::task::JoinHandle;
use torrust_seeder_primitives::job::JobState;

use crate::bootstrap::jobs::{health_monitor, seeding, stats_flush};
use crate::core::supervisor::Outcome;
use crate::core::Seeder;
use crate::shutdown::Shutdown;

/// Handles of the running jobs.
pub struct Jobs {
    pub seeding: Vec<JoinHandle<Outcome>>,
    pub periodic: Vec<JoinHandle<()>>,
}

impl Jobs {
    /// Waits for every job to finish.
    pub async fn join(self) -> Vec<Outcome> {
        let outcomes = futures::future::join_all(self.seeding).await;

        for result in futures::future::join_all(self.periodic).await {
            if let Err(err) = result {
                tracing::error!(%err, "a periodic job did not finish cleanly");
            }
        }

        outcomes
            .into_iter()
            .map(|result| {
                result.unwrap_or_else(|err| {
                    tracing::error!(%err, "a seeding job did not finish cleanly");
                    Outcome::Cancelled {
                        state: JobState::default(),
                    }
                })
            })
            .collect()
    }
}

/// It starts every job.
pub async fn start(seeder: &Arc<Seeder>, shutdown: &Shutdown) -> Jobs {
    let config = seeder.config();

    let mut jobs = Jobs {
        seeding: Vec::new(),
        periodic: Vec::new(),
    };

    // Start one supervisor per source
    for job in seeder.registry().snapshot().await {
        jobs.seeding.push(seeding::start_job(
            seeder,
            job.id,
            config.metadata.timeout(),
            shutdown.signal(),
        ));
    }

    // Start runners to persist the uploaded bytes, every interval
    jobs.periodic
        .push(stats_flush::start_job(seeder, config.stats_ledger.flush_interval(), shutdown.signal()));

    // Start runners to re-announce under-peered swarms, every interval
    jobs.periodic
        .push(health_monitor::start_job(seeder, config.health_monitor.interval(), shutdown.signal()));

    jobs
}

/// It starts every job, waits for the shutdown and then for every job to
/// finish.
pub async fn run(seeder: Arc<Seeder>, shutdown: Shutdown) {
    let jobs = start(&seeder, &shutdown).await;

    shutdown.wait().await;

    tracing::info!(reason = ?shutdown.reason(), "Torrust seeder shutting down..");

    let outcomes = jobs.join().await;

    let seeded = outcomes.iter().filter(|outcome| **outcome == Outcome::Seeded).count();
    let failed = outcomes.iter().filter(|outcome| **outcome == Outcome::Failed).count();

    tracing::info!(
        seeded,
        failed,
        total_uploaded = seeder.ledger().cumulative_uploaded().await,
        "Torrust seeder successfully shutdown."
    );
}
