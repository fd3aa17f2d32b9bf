//! The seeding domain.
//!
//! The [`Seeder`] is the context shared by every task of the application. It
//! owns:
//!
//! - The [`configuration`](torrust_seeder_configuration::Configuration).
//! - The [swarm engine](crate::engine::SwarmEngine) handle.
//! - The [`Registry`](registry::Registry) of jobs.
//! - The metadata [`Acquirer`](metadata::Acquirer).
//! - The [`StatsLedger`](ledger::StatsLedger).
//! - The [`HealthMonitor`](health::HealthMonitor).
//!
//! ```text
//!                      +-> JobSupervisor (one per source) --+
//! Seeder (Arc) --------+-> stats flush job -----------------+--> SwarmEngine
//!                      +-> health monitor job --------------+
//! ```
//!
//! The job supervisors are the only writers of the registry. The periodic
//! jobs only read the list of active swarms and the engine statistics.
pub mod descriptor;
pub mod error;
pub mod health;
pub mod ledger;
pub mod metadata;
pub mod registry;
pub mod source;
pub mod supervisor;

use std::sync::Arc;

use torrust_seeder_configuration::Configuration;

use self::health::HealthMonitor;
use self::ledger::{StatsFile, StatsLedger};
use self::metadata::Acquirer;
use self::registry::Registry;
use crate::engine::{SwarmEngine, SwarmEngineHandle};
use crate::shutdown::ShutdownSignal;

pub use self::error::Error;

pub struct Seeder {
    config: Arc<Configuration>,
    engine: SwarmEngineHandle,
    registry: Registry,
    acquirer: Acquirer,
    ledger: StatsLedger,
    health: HealthMonitor,
}

impl Seeder {
    /// Builds the context from the configuration. It reads the persisted
    /// upload total and creates one `Pending` job per source.
    ///
    /// # Errors
    ///
    /// Will return an error if the HTTP client for the descriptors can not be
    /// built.
    pub async fn new(config: Arc<Configuration>, engine: SwarmEngineHandle) -> Result<Self, metadata::Error> {
        let data_dir = config.seeder.data_dir.clone().into_std_path_buf();

        let acquirer = Acquirer::new(data_dir, config.metadata.http_timeout())?;

        let ledger = StatsLedger::open(StatsFile::new(config.seeder.stats_file_path().into_std_path_buf())).await;

        Ok(Self {
            registry: Registry::from_sources(&config.seeder.sources),
            health: HealthMonitor::new(config.health_monitor.peer_floor),
            acquirer,
            ledger,
            engine,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    #[must_use]
    pub fn engine(&self) -> &dyn SwarmEngine {
        self.engine.as_ref()
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn acquirer(&self) -> &Acquirer {
        &self.acquirer
    }

    #[must_use]
    pub fn ledger(&self) -> &StatsLedger {
        &self.ledger
    }

    #[must_use]
    pub fn health(&self) -> &HealthMonitor {
        &self.health
    }

    /// Persists the bytes uploaded since the last flush.
    ///
    /// # Errors
    ///
    /// Will return an error if the stats file can not be written. The total is
    /// kept in memory for the next flush.
    pub async fn flush_stats(&self) -> Result<u64, ledger::Error> {
        let swarms = self.registry.active_swarms().await;

        self.ledger.flush(self.engine(), &swarms).await
    }

    /// Re-announces the active swarms that have too few peers. Pending
    /// announces are abandoned when the shutdown arrives.
    pub async fn check_health(&self, shutdown: &ShutdownSignal) -> health::HealthReport {
        let swarms = self.registry.active_swarms().await;

        self.health.check(self.engine(), &swarms, shutdown).await
    }
}
