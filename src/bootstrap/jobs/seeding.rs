//! Job that drives one source until it is seeded.
//!
//! Refer to the [`supervisor`](crate::core::supervisor) module for the job
//! lifecycle.
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use torrust_seeder_primitives::job::JobId;

use crate::core::supervisor::{JobSupervisor, Outcome};
use crate::core::Seeder;
use crate::shutdown::ShutdownSignal;

/// It starts the supervisor of the job `id`.
///
/// The metadata wait is bounded by `metadata_timeout`, the `[metadata]`
/// `timeout` option in the application.
#[must_use]
pub fn start_job(seeder: &Arc<Seeder>, id: JobId, metadata_timeout: Duration, shutdown: ShutdownSignal) -> JoinHandle<Outcome> {
    let supervisor = JobSupervisor::new(seeder.clone(), metadata_timeout);

    tokio::spawn(async move {
        let outcome = supervisor.supervise(id, shutdown).await;

        tracing::debug!(job = %id, ?outcome, "seeding job finished");

        outcome
    })
}
