pub mod contract;

use std::sync::Arc;
use std::time::Duration;

use torrust_seeder::bootstrap::app::initialize_with_configuration;
use torrust_seeder::core::Seeder;
use torrust_seeder_configuration::Configuration;
use torrust_seeder_primitives::job::{JobId, JobState};

use crate::common::engine::FakeEngine;
use crate::common::within;

/// Upper bound for anything a test waits for.
pub const PATIENCE: Duration = Duration::from_secs(5);

/// A seeder wired to an in memory engine. No job is started.
pub struct Environment {
    pub config: Arc<Configuration>,
    pub engine: Arc<FakeEngine>,
    pub seeder: Arc<Seeder>,
}

impl Environment {
    pub async fn new(config: Configuration, engine: FakeEngine) -> Self {
        let config = Arc::new(config);
        let engine = Arc::new(engine);

        let seeder = initialize_with_configuration(&config, engine.clone()).await.unwrap();

        Self { config, engine, seeder }
    }

    pub async fn state(&self, id: JobId) -> JobState {
        self.seeder.registry().get(id).await.unwrap().state
    }

    pub async fn wait_for_state(&self, id: JobId, expected: JobState) {
        within(PATIENCE, &format!("{id} is {expected}"), async {
            while self.state(id).await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
    }

    pub async fn wait_for_persisted_total(&self, expected: u64) {
        let file = self.seeder.ledger().file();

        within(PATIENCE, &format!("the stats file holds {expected}"), async {
            while file.read().await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
    }

    /// Sets the session upload counter of every active swarm.
    pub async fn upload_from_every_swarm(&self, uploaded_bytes: u64) {
        for swarm in self.seeder.registry().active_swarms().await {
            self.engine.set_uploaded(&swarm.info_hash, uploaded_bytes);
        }
    }
}
