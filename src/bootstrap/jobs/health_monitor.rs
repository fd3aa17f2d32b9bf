//! Job that checks the swarm health on intervals.
//!
//! Every active swarm with fewer peers than `peer_floor` is announced again to
//! its trackers and to the DHT. Failed announces are not retried before the
//! next tick. An announce still pending when the shutdown arrives is
//! abandoned.
//!
//! Refer to [`torrust-seeder-configuration documentation`](https://docs.rs/torrust-seeder-configuration) for the `interval` and `peer_floor` options.
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core::Seeder;
use crate::shutdown::ShutdownSignal;

/// It starts a job that checks the health of the active swarms every
/// `interval`. The first check happens one `interval` after the job starts.
#[must_use]
pub fn start_job(seeder: &Arc<Seeder>, interval: Duration, shutdown: ShutdownSignal) -> JoinHandle<()> {
    let weak_seeder = std::sync::Arc::downgrade(seeder);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    tracing::info!("Stopping health monitor job..");
                    break;
                }
                _ = interval.tick() => {
                    if let Some(seeder) = weak_seeder.upgrade() {
                        let start_time = Utc::now().time();
                        tracing::info!("Re-announcing torrents to trackers and DHT...");

                        let report = seeder.check_health(&shutdown).await;

                        tracing::info!(
                            sampled = report.sampled,
                            under_peered = report.under_peered.len(),
                            announces_succeeded = report.announces_succeeded,
                            announces_failed = report.announces_failed,
                            interrupted = report.interrupted,
                            "Checked swarm health in: {}ms",
                            (Utc::now().time() - start_time).num_milliseconds()
                        );
                    } else {
                        break;
                    }
                }
            }
        }
    })
}
