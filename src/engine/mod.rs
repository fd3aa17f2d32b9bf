//! The swarm engine seam.
//!
//! The seeder does not speak the peer wire protocol, verify pieces, run a DHT
//! node or talk to trackers. All of that is delegated to a swarm engine behind
//! the [`SwarmEngine`] trait. The seeder only adds swarms, waits for them,
//! reads their statistics and asks for new announces.
//!
//! Implementations must be safe to share between all the seeding jobs and the
//! periodic jobs at the same time.
//!
//! Available engines:
//!
//! - [`rqbit`] (cargo feature `rqbit`, on by default): backed by a `librqbit` session.
#[cfg(feature = "rqbit")]
pub mod rqbit;

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use torrust_seeder_primitives::info_hash::InfoHash;
use torrust_seeder_primitives::swarm::SwarmStats;
use url::Url;

use crate::core::descriptor::Descriptor;
use crate::core::source::MagnetLink;

/// The engine shared by every job.
pub type SwarmEngineHandle = Arc<dyn SwarmEngine>;

/// Errors reported by the swarm engine. They are always scoped to one swarm
/// or one announce and never stop the seeder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("the swarm engine rejected the swarm: {reason}")]
    Rejected { reason: String },

    #[error("the swarm engine does not know the swarm {info_hash}")]
    UnknownSwarm { info_hash: InfoHash },

    #[error("the metadata for swarm {info_hash} could not be resolved: {reason}")]
    MetadataUnavailable { info_hash: InfoHash, reason: String },

    #[error("the content of swarm {info_hash} could not be downloaded: {reason}")]
    DownloadFailed { info_hash: InfoHash, reason: String },

    #[error("the swarm {info_hash} could not be removed: {reason}")]
    RemoveFailed { info_hash: InfoHash, reason: String },

    #[error("announce of swarm {info_hash} to {target} failed: {reason}")]
    AnnounceFailed {
        info_hash: InfoHash,
        target: String,
        reason: String,
    },
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SwarmEngine: Send + Sync {
    /// Adds the swarm described by a `.torrent` descriptor.
    ///
    /// # Errors
    ///
    /// Will return an error if the engine refuses the swarm.
    async fn add_descriptor(&self, descriptor: &Descriptor) -> Result<InfoHash, Error>;

    /// Adds a swarm identified by a magnet link. The metadata is resolved
    /// later, from peers.
    ///
    /// # Errors
    ///
    /// Will return an error if the engine refuses the swarm.
    async fn add_magnet(&self, magnet: &MagnetLink) -> Result<InfoHash, Error>;

    /// Resolves once the swarm metadata is available.
    ///
    /// # Errors
    ///
    /// Will return an error if the metadata can not be resolved.
    async fn wait_for_metadata(&self, info_hash: &InfoHash) -> Result<(), Error>;

    /// Tells the engine to download the whole content of the swarm.
    ///
    /// # Errors
    ///
    /// Will return an error if the swarm is unknown or the directive is refused.
    async fn download_all(&self, info_hash: &InfoHash) -> Result<(), Error>;

    /// Resolves once the whole content is on disk and verified.
    ///
    /// # Errors
    ///
    /// Will return an error if the content can not be completed.
    async fn wait_for_completion(&self, info_hash: &InfoHash) -> Result<(), Error>;

    /// Stops working on the swarm and forgets it. The content already on
    /// disk is kept.
    ///
    /// # Errors
    ///
    /// Will return an error if the engine can not stop the swarm.
    async fn remove(&self, info_hash: &InfoHash) -> Result<(), Error>;

    /// Session scoped statistics of a swarm, `None` if the swarm is unknown.
    fn stats(&self, info_hash: &InfoHash) -> Option<SwarmStats>;

    /// Trackers known to the swarm.
    fn trackers(&self, info_hash: &InfoHash) -> Vec<Url>;

    /// Announces the swarm again to every one of its [`trackers`](Self::trackers).
    ///
    /// # Errors
    ///
    /// Will return an error if the announces can not be issued.
    async fn reannounce_to_trackers(&self, info_hash: &InfoHash) -> Result<(), Error>;

    /// Announces the swarm to the DHT, telling other nodes that peers can
    /// connect on `port`.
    ///
    /// # Errors
    ///
    /// Will return an error if the announce fails.
    async fn announce_to_dht(&self, info_hash: &InfoHash, port: u16) -> Result<(), Error>;

    /// Port where the engine accepts incoming peer connections.
    fn listen_port(&self) -> Option<u16>;
}
