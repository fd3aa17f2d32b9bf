//! The job supervisor.
//!
//! It drives one job through its states:
//!
//! ```text
//! Pending -> AcquiringMetadata -> VerifyingContent -> Seeding -> (shutdown)
//! ```
//!
//! 1. `AcquiringMetadata`: the source is resolved by the metadata acquirer,
//!    the swarm is added to the engine and the supervisor waits until the
//!    engine has the swarm metadata. The wait is bounded by the metadata
//!    timeout.
//! 2. `VerifyingContent`: the engine is told to download the whole content and
//!    the supervisor waits until everything is on disk and verified. This wait
//!    has no deadline, a large content can take hours.
//! 3. `Seeding`: the supervisor holds the job until the shutdown.
//!
//! Every wait is raced against the shutdown signal and the shutdown wins when
//! both are ready. Any error marks the job as `Failed` and ends the
//! supervisor; the other jobs are not affected.
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use torrust_seeder_primitives::as_mib;
use torrust_seeder_primitives::info_hash::InfoHash;
use torrust_seeder_primitives::job::{JobId, JobState};

use super::error::Error;
use super::metadata::Metadata;
use super::registry;
use super::source::Source;
use super::Seeder;
use crate::shutdown::ShutdownSignal;

/// How a supervised job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The job was seeding when the shutdown arrived.
    Seeded,
    /// The job failed. The reason is in the registry.
    Failed,
    /// The shutdown arrived before the job reached `Seeding`.
    Cancelled { state: JobState },
}

pub struct JobSupervisor {
    seeder: Arc<Seeder>,
    metadata_timeout: Duration,
}

impl JobSupervisor {
    #[must_use]
    pub fn new(seeder: Arc<Seeder>, metadata_timeout: Duration) -> Self {
        Self {
            seeder,
            metadata_timeout,
        }
    }

    /// Runs the job until the shutdown or until it fails.
    pub async fn supervise(&self, id: JobId, shutdown: ShutdownSignal) -> Outcome {
        match self.run(id, &shutdown).await {
            Ok(Some(())) => Outcome::Seeded,
            Ok(None) => {
                let state = self.seeder.registry().get(id).await.map(|job| job.state).unwrap_or_default();

                tracing::info!(job = %id, %state, "job stopped before seeding");

                Outcome::Cancelled { state }
            }
            Err(err) => {
                let job = self.seeder.registry().get(id).await;
                let source = job.as_ref().map(|job| job.source.as_str()).unwrap_or_default();

                tracing::error!(job = %id, %source, %err, "job failed");

                self.seeder.registry().fail(id, err.to_string()).await;

                if let Some(info_hash) = job.and_then(|job| job.info_hash) {
                    self.drop_swarm(id, info_hash).await;
                }

                Outcome::Failed
            }
        }
    }

    /// Removes the swarm of a failed job from the engine, unless another job
    /// is still working on the same swarm.
    async fn drop_swarm(&self, id: JobId, info_hash: InfoHash) {
        let shared = self
            .seeder
            .registry()
            .active_swarms()
            .await
            .iter()
            .any(|swarm| swarm.info_hash == info_hash);

        if shared {
            tracing::debug!(job = %id, %info_hash, "the swarm is kept, another job is using it");
            return;
        }

        match self.seeder.engine().remove(&info_hash).await {
            Ok(()) => tracing::info!(job = %id, %info_hash, "swarm removed from the engine"),
            Err(err) => tracing::warn!(job = %id, %info_hash, %err, "could not remove the swarm from the engine"),
        }
    }

    /// `Ok(None)` means the shutdown interrupted the job.
    async fn run(&self, id: JobId, shutdown: &ShutdownSignal) -> Result<Option<()>, Error> {
        let registry = self.seeder.registry();
        let engine = self.seeder.engine();

        let job = registry.get(id).await.ok_or(registry::Error::UnknownJob { id })?;

        registry.advance(id, JobState::AcquiringMetadata).await?;

        let source = Source::from_str(&job.source)?;

        tracing::info!(job = %id, %source, "acquiring metadata");

        let Some(metadata) = shutdown.until_cancelled(self.seeder.acquirer().acquire(&source)).await else {
            return Ok(None);
        };

        let metadata = metadata?;

        let added = match &metadata {
            Metadata::Descriptor(descriptor) => {
                registry.set_name(id, descriptor.name().to_owned()).await?;
                shutdown.until_cancelled(engine.add_descriptor(descriptor)).await
            }
            Metadata::Magnet(magnet) => {
                if let Some(name) = magnet.display_name() {
                    registry.set_name(id, name.to_owned()).await?;
                }
                shutdown.until_cancelled(engine.add_magnet(magnet)).await
            }
        };

        let Some(info_hash) = added.transpose()? else {
            return Ok(None);
        };

        registry.set_identity(id, info_hash).await?;

        tracing::info!(job = %id, %info_hash, "swarm added, waiting for its metadata");

        let Some(resolved) = shutdown.until_cancelled(tokio::time::timeout(self.metadata_timeout, engine.wait_for_metadata(&info_hash))).await
        else {
            return Ok(None);
        };

        resolved
            .map_err(|_elapsed| Error::MetadataTimeout {
                info_hash,
                timeout: self.metadata_timeout,
            })?
            .map_err(Error::from)?;

        if let Some(name) = engine.stats(&info_hash).and_then(|stats| stats.name) {
            registry.set_name(id, name).await?;
        }

        registry.advance(id, JobState::VerifyingContent).await?;

        tracing::info!(job = %id, %info_hash, "downloading and verifying the content");

        if shutdown.until_cancelled(engine.download_all(&info_hash)).await.transpose()?.is_none() {
            return Ok(None);
        }

        if shutdown.until_cancelled(engine.wait_for_completion(&info_hash)).await.transpose()?.is_none() {
            return Ok(None);
        }

        registry.advance(id, JobState::Seeding).await?;

        self.log_seeding(id, info_hash, &metadata).await;

        shutdown.cancelled().await;

        tracing::debug!(job = %id, %info_hash, "stopped seeding");

        Ok(Some(()))
    }

    async fn log_seeding(&self, id: JobId, info_hash: InfoHash, metadata: &Metadata) {
        let stats = self.seeder.engine().stats(&info_hash).unwrap_or_default();

        let size = match metadata {
            Metadata::Descriptor(descriptor) if stats.total_bytes == 0 => descriptor.total_length(),
            _ => stats.total_bytes,
        };

        let name = self
            .seeder
            .registry()
            .get(id)
            .await
            .map(|job| job.display_name().to_owned())
            .unwrap_or_default();

        tracing::info!(job = %id, %info_hash, "Seeding: {name} ({:.2} MB)", as_mib(size));
    }
}
