//! Swarm health checks.
//!
//! A swarm with fewer connected peers than the configured floor is announced
//! again to every tracker it knows and to the DHT, so new peers can find it.
//! The engine announces to the trackers of the swarm in one go, each tracker
//! counts as one announce in the [`HealthReport`].
//! Announces are best effort: a failure is logged and the next announce is
//! tried anyway.
use torrust_seeder_primitives::swarm::PeerPressureSample;

use super::registry::ActiveSwarm;
use crate::engine::SwarmEngine;
use crate::shutdown::ShutdownSignal;

/// Outcome of one health check.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HealthReport {
    /// Swarms whose peer count could be read.
    pub sampled: usize,
    /// Swarms below the peer floor.
    pub under_peered: Vec<PeerPressureSample>,
    /// One announce per tracker and one to the DHT.
    pub announces_succeeded: usize,
    pub announces_failed: usize,
    /// The shutdown arrived before every announce finished.
    pub interrupted: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct HealthMonitor {
    peer_floor: usize,
}

impl HealthMonitor {
    #[must_use]
    pub fn new(peer_floor: usize) -> Self {
        Self { peer_floor }
    }

    #[must_use]
    pub fn peer_floor(&self) -> usize {
        self.peer_floor
    }

    /// Reads the current peer count of every swarm the engine knows.
    #[must_use]
    pub fn sample(&self, engine: &dyn SwarmEngine, swarms: &[ActiveSwarm]) -> Vec<PeerPressureSample> {
        swarms
            .iter()
            .filter_map(|swarm| {
                engine
                    .stats(&swarm.info_hash)
                    .map(|stats| PeerPressureSample::new(swarm.job, swarm.info_hash, stats.peers))
            })
            .collect()
    }

    /// Samples every swarm and re-announces the under-peered ones.
    ///
    /// The check stops at the first announce that is still pending when the
    /// shutdown arrives; the report then only counts the finished announces.
    pub async fn check(&self, engine: &dyn SwarmEngine, swarms: &[ActiveSwarm], shutdown: &ShutdownSignal) -> HealthReport {
        let samples = self.sample(engine, swarms);

        let mut report = HealthReport {
            sampled: samples.len(),
            ..HealthReport::default()
        };

        for sample in samples.into_iter().filter(|sample| sample.is_below(self.peer_floor)) {
            if shutdown.is_cancelled() {
                report.interrupted = true;
                break;
            }

            let name = swarms
                .iter()
                .find(|swarm| swarm.job == sample.job)
                .map_or("", |swarm| swarm.name.as_str());

            tracing::info!(job = %sample.job, info_hash = %sample.info_hash, peers = sample.peers, peer_floor = self.peer_floor, "Re-announcing: {name}");

            let completed = Self::reannounce(engine, &sample, &mut report, shutdown).await;

            report.under_peered.push(sample);

            if completed.is_none() {
                tracing::debug!("health check interrupted by the shutdown");
                report.interrupted = true;
                break;
            }
        }

        report
    }

    /// `None` if the shutdown interrupted the announces.
    async fn reannounce(
        engine: &dyn SwarmEngine,
        sample: &PeerPressureSample,
        report: &mut HealthReport,
        shutdown: &ShutdownSignal,
    ) -> Option<()> {
        let trackers = engine.trackers(&sample.info_hash);

        if !trackers.is_empty() {
            match shutdown.until_cancelled(engine.reannounce_to_trackers(&sample.info_hash)).await? {
                Ok(()) => report.announces_succeeded += trackers.len(),
                Err(err) => {
                    tracing::warn!(job = %sample.job, trackers = trackers.len(), %err, "tracker announce failed");
                    report.announces_failed += trackers.len();
                }
            }
        }

        match engine.listen_port() {
            Some(port) => match shutdown.until_cancelled(engine.announce_to_dht(&sample.info_hash, port)).await? {
                Ok(()) => report.announces_succeeded += 1,
                Err(err) => {
                    tracing::warn!(job = %sample.job, port, %err, "DHT announce failed");
                    report.announces_failed += 1;
                }
            },
            None => {
                tracing::warn!(job = %sample.job, "the engine is not listening for peers, skipping the DHT announce");
                report.announces_failed += 1;
            }
        }

        Some(())
    }
}
