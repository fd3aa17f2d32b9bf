//! Job that persists the uploaded bytes on intervals.
//!
//! On every tick it adds the bytes the active swarms uploaded since the
//! previous tick to the cumulative total and writes it to the stats file.
//!
//! When the shutdown is triggered it flushes one last time, so the bytes
//! uploaded after the last tick are not lost, and then it stops.
//!
//! Refer to [`torrust-seeder-configuration documentation`](https://docs.rs/torrust-seeder-configuration) for the `flush_interval` option.
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core::Seeder;
use crate::shutdown::ShutdownSignal;

/// Upper bound for the flush done on shutdown.
pub const FINAL_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// It starts a job that flushes the stats ledger every `interval`.
///
/// The first flush happens one `interval` after the job starts.
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
                    tracing::info!("Stopping stats flush job..");

                    if let Some(seeder) = weak_seeder.upgrade() {
                        if tokio::time::timeout(FINAL_FLUSH_TIMEOUT, flush(&seeder)).await.is_err() {
                            tracing::error!("the final stats flush did not finish in time");
                        }
                    }

                    break;
                }
                _ = interval.tick() => {
                    if let Some(seeder) = weak_seeder.upgrade() {
                        flush(&seeder).await;
                    } else {
                        break;
                    }
                }
            }
        }
    })
}

async fn flush(seeder: &Seeder) {
    let start_time = Utc::now().time();

    match seeder.flush_stats().await {
        Ok(total) => tracing::debug!(
            total,
            "Flushed stats in: {}ms",
            (Utc::now().time() - start_time).num_milliseconds()
        ),
        Err(err) => tracing::error!(%err, "could not persist the upload total, it will be written on the next flush"),
    }
}
