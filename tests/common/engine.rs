//! In memory swarm engine.
//!
//! Swarms resolve their metadata and complete their content immediately,
//! unless the engine is built with [`FakeEngine::without_metadata`]. DHT
//! announces answer at once, unless it is built with
//! [`FakeEngine::with_stalled_announces`]. The tests drive the upload counters
//! and the peer counts by hand.
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use torrust_seeder::core::descriptor::Descriptor;
use torrust_seeder::core::source::MagnetLink;
use torrust_seeder::engine::{Error, SwarmEngine};
use torrust_seeder_primitives::info_hash::InfoHash;
use torrust_seeder_primitives::swarm::SwarmStats;
use url::Url;

const MAGNET_CONTENT_LENGTH: u64 = 1024 * 1024;

#[derive(Default)]
pub struct FakeEngine {
    swarms: Mutex<HashMap<InfoHash, SwarmStats>>,
    trackers: Mutex<HashMap<InfoHash, Vec<Url>>>,
    metadata_never_resolves: bool,
    announces_never_answer: bool,
    dht_announces: AtomicUsize,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that never finds the metadata of any swarm.
    pub fn without_metadata() -> Self {
        Self {
            metadata_never_resolves: true,
            ..Self::default()
        }
    }

    /// An engine whose DHT announces never get an answer.
    pub fn with_stalled_announces() -> Self {
        Self {
            announces_never_answer: true,
            ..Self::default()
        }
    }

    /// DHT announces started so far, answered or not.
    pub fn dht_announces(&self) -> usize {
        self.dht_announces.load(Ordering::SeqCst)
    }

    pub fn set_uploaded(&self, info_hash: &InfoHash, uploaded_bytes: u64) {
        if let Some(stats) = self.swarms.lock().unwrap_or_else(PoisonError::into_inner).get_mut(info_hash) {
            stats.uploaded_bytes = uploaded_bytes;
        }
    }

    pub fn swarm_count(&self) -> usize {
        self.swarms.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn add(&self, info_hash: InfoHash, name: Option<String>, total_bytes: u64, trackers: Vec<Url>) {
        self.swarms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(info_hash)
            .or_insert(SwarmStats {
                name,
                total_bytes,
                ..SwarmStats::default()
            });

        self.trackers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(info_hash, trackers);
    }

    fn known(&self, info_hash: &InfoHash) -> Result<(), Error> {
        if self.swarms.lock().unwrap_or_else(PoisonError::into_inner).contains_key(info_hash) {
            Ok(())
        } else {
            Err(Error::UnknownSwarm { info_hash: *info_hash })
        }
    }
}

#[async_trait]
impl SwarmEngine for FakeEngine {
    async fn add_descriptor(&self, descriptor: &Descriptor) -> Result<InfoHash, Error> {
        let info_hash = descriptor.info_hash();

        self.add(
            info_hash,
            Some(descriptor.name().to_owned()),
            descriptor.total_length(),
            descriptor.trackers().to_vec(),
        );

        Ok(info_hash)
    }

    async fn add_magnet(&self, magnet: &MagnetLink) -> Result<InfoHash, Error> {
        let info_hash = magnet.info_hash().ok_or_else(|| Error::Rejected {
            reason: "the magnet link has no hex info-hash".to_owned(),
        })?;

        self.add(
            info_hash,
            magnet.display_name().map(ToOwned::to_owned),
            MAGNET_CONTENT_LENGTH,
            magnet.trackers().to_vec(),
        );

        Ok(info_hash)
    }

    async fn wait_for_metadata(&self, info_hash: &InfoHash) -> Result<(), Error> {
        self.known(info_hash)?;

        if self.metadata_never_resolves {
            std::future::pending::<()>().await;
        }

        Ok(())
    }

    async fn download_all(&self, info_hash: &InfoHash) -> Result<(), Error> {
        self.known(info_hash)
    }

    async fn wait_for_completion(&self, info_hash: &InfoHash) -> Result<(), Error> {
        if let Some(stats) = self.swarms.lock().unwrap_or_else(PoisonError::into_inner).get_mut(info_hash) {
            stats.completed_bytes = stats.total_bytes;
            return Ok(());
        }

        Err(Error::UnknownSwarm { info_hash: *info_hash })
    }

    async fn remove(&self, info_hash: &InfoHash) -> Result<(), Error> {
        self.swarms.lock().unwrap_or_else(PoisonError::into_inner).remove(info_hash);
        self.trackers.lock().unwrap_or_else(PoisonError::into_inner).remove(info_hash);

        Ok(())
    }

    fn stats(&self, info_hash: &InfoHash) -> Option<SwarmStats> {
        self.swarms.lock().unwrap_or_else(PoisonError::into_inner).get(info_hash).cloned()
    }

    fn trackers(&self, info_hash: &InfoHash) -> Vec<Url> {
        self.trackers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(info_hash)
            .cloned()
            .unwrap_or_default()
    }

    async fn reannounce_to_trackers(&self, info_hash: &InfoHash) -> Result<(), Error> {
        self.known(info_hash)
    }

    async fn announce_to_dht(&self, info_hash: &InfoHash, _port: u16) -> Result<(), Error> {
        self.known(info_hash)?;

        self.dht_announces.fetch_add(1, Ordering::SeqCst);

        if self.announces_never_answer {
            std::future::pending::<()>().await;
        }

        Ok(())
    }

    fn listen_port(&self) -> Option<u16> {
        Some(6881)
    }
}
