//! Swarm engine backed by a [`librqbit`] session.
//!
//! Enabled with the `rqbit` cargo feature, on by default.
//!
//! `librqbit` resolves the metadata of a magnet link while the swarm is being
//! added. The adapter runs that addition in the background so the job
//! supervisor can bound the wait with its own metadata timeout. The initial
//! check of the content already on disk happens afterwards, while the job
//! waits for the completion, so it is not bounded by that timeout.
//!
//! `librqbit` announces to the trackers when a swarm starts. A tracker
//! re-announce pauses the swarm and starts it again.
use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use librqbit::api::TorrentIdOrHash;
use librqbit::dht::Id20;
use librqbit::{AddTorrent, AddTorrentOptions, AddTorrentResponse, ManagedTorrent, Session, SessionOptions};
use tokio::sync::watch;
use tokio::task::AbortHandle;
use torrust_seeder_configuration::Engine as EngineConfig;
use torrust_seeder_primitives::info_hash::InfoHash;
use torrust_seeder_primitives::swarm::SwarmStats;
use url::Url;

use super::{Error, SwarmEngine};
use crate::core::descriptor::Descriptor;
use crate::core::source::MagnetLink;

const DHT_ANNOUNCE_TIMEOUT: Duration = Duration::from_secs(10);

type Handle = Arc<ManagedTorrent>;

type Resolution = Option<Result<Handle, String>>;

struct Swarm {
    resolution: watch::Receiver<Resolution>,
    addition: AbortHandle,
    trackers: Vec<Url>,
}

pub struct RqbitEngine {
    session: Arc<Session>,
    output_folder: PathBuf,
    swarms: Mutex<HashMap<InfoHash, Swarm>>,
}

/// The `librqbit` session options for the `[engine]` configuration.
#[must_use]
pub fn session_options(config: &EngineConfig) -> SessionOptions {
    SessionOptions {
        disable_dht: !config.dht,
        disable_dht_persistence: true,
        listen_port_range: Some(config.listen_ports()),
        enable_upnp_port_forwarding: config.upnp_port_forwarding,
        ..Default::default()
    }
}

fn torrent_id(info_hash: &InfoHash) -> TorrentIdOrHash {
    TorrentIdOrHash::Hash(Id20::new(info_hash.0))
}

fn download_failed(info_hash: &InfoHash, err: &dyn Display) -> Error {
    Error::DownloadFailed {
        info_hash: *info_hash,
        reason: format!("{err:#}"),
    }
}

impl RqbitEngine {
    /// Starts a `librqbit` session that stores the content in `output_folder`.
    ///
    /// # Errors
    ///
    /// Will return an error if the session can not be started, for example
    /// when every listening port is taken.
    pub async fn start(output_folder: PathBuf, config: &EngineConfig) -> Result<Self, Error> {
        let session = Session::new_with_opts(output_folder.clone(), session_options(config))
            .await
            .map_err(|err| Error::Rejected {
                reason: format!("could not start the librqbit session: {err:#}"),
            })?;

        Ok(Self {
            session,
            output_folder,
            swarms: Mutex::new(HashMap::new()),
        })
    }

    fn add_options(&self) -> AddTorrentOptions {
        AddTorrentOptions {
            output_folder: Some(self.output_folder.to_string_lossy().into_owned()),
            overwrite: true,
            ..Default::default()
        }
    }

    /// Adds the swarm in the background and remembers it under `info_hash`.
    /// A swarm that is already known is not added twice.
    fn spawn_addition(&self, info_hash: InfoHash, add: AddTorrent<'static>, trackers: Vec<Url>) {
        let mut swarms = self.swarms.lock().unwrap_or_else(PoisonError::into_inner);

        if swarms.contains_key(&info_hash) {
            tracing::debug!(%info_hash, "the swarm is already in the librqbit session");
            return;
        }

        let (sender, resolution) = watch::channel(None);

        let session = self.session.clone();
        let options = self.add_options();

        let addition = tokio::spawn(async move {
            let result = match session.add_torrent(add, Some(options)).await {
                Ok(AddTorrentResponse::Added(_, handle) | AddTorrentResponse::AlreadyManaged(_, handle)) => Ok(handle),
                Ok(AddTorrentResponse::ListOnly(_)) => Err("the swarm was only listed".to_owned()),
                Err(err) => Err(format!("{err:#}")),
            };

            let _unused = sender.send(Some(result));
        })
        .abort_handle();

        swarms.insert(
            info_hash,
            Swarm {
                resolution,
                addition,
                trackers,
            },
        );
    }

    fn resolution(&self, info_hash: &InfoHash) -> Result<watch::Receiver<Resolution>, Error> {
        let swarms = self.swarms.lock().unwrap_or_else(PoisonError::into_inner);

        swarms
            .get(info_hash)
            .map(|swarm| swarm.resolution.clone())
            .ok_or(Error::UnknownSwarm { info_hash: *info_hash })
    }

    /// Waits until the background addition has finished.
    async fn handle(&self, info_hash: &InfoHash) -> Result<Handle, Error> {
        let mut resolution = self.resolution(info_hash)?;

        let resolved = resolution
            .wait_for(Option::is_some)
            .await
            .map_err(|_closed| Error::MetadataUnavailable {
                info_hash: *info_hash,
                reason: "the swarm addition was dropped".to_owned(),
            })?
            .clone();

        match resolved {
            Some(Ok(handle)) => Ok(handle),
            Some(Err(reason)) => Err(Error::MetadataUnavailable {
                info_hash: *info_hash,
                reason,
            }),
            None => Err(Error::UnknownSwarm { info_hash: *info_hash }),
        }
    }

    fn resolved_handle(&self, info_hash: &InfoHash) -> Option<Handle> {
        let resolution = self.resolution(info_hash).ok()?;

        let resolved = resolution.borrow().clone();

        resolved.and_then(Result::ok)
    }
}

#[async_trait]
impl SwarmEngine for RqbitEngine {
    async fn add_descriptor(&self, descriptor: &Descriptor) -> Result<InfoHash, Error> {
        let info_hash = descriptor.info_hash();

        self.spawn_addition(
            info_hash,
            AddTorrent::from_bytes(descriptor.bytes().to_vec()),
            descriptor.trackers().to_vec(),
        );

        Ok(info_hash)
    }

    async fn add_magnet(&self, magnet: &MagnetLink) -> Result<InfoHash, Error> {
        let info_hash = magnet.info_hash().ok_or_else(|| Error::Rejected {
            reason: format!("only hex encoded info-hashes are supported: {}", magnet.uri()),
        })?;

        self.spawn_addition(
            info_hash,
            AddTorrent::from_url(magnet.uri().to_owned()),
            magnet.trackers().to_vec(),
        );

        Ok(info_hash)
    }

    async fn wait_for_metadata(&self, info_hash: &InfoHash) -> Result<(), Error> {
        // The addition only finishes once the metadata is known.
        self.handle(info_hash).await.map(|_| ())
    }

    async fn download_all(&self, info_hash: &InfoHash) -> Result<(), Error> {
        // Every file is selected when the swarm is added.
        self.handle(info_hash).await.map(|_| ())
    }

    async fn wait_for_completion(&self, info_hash: &InfoHash) -> Result<(), Error> {
        let handle = self.handle(info_hash).await?;

        handle
            .wait_until_initialized()
            .await
            .map_err(|err| download_failed(info_hash, &err))?;

        handle
            .wait_until_completed()
            .await
            .map_err(|err| download_failed(info_hash, &err))
    }

    async fn remove(&self, info_hash: &InfoHash) -> Result<(), Error> {
        let swarm = self.swarms.lock().unwrap_or_else(PoisonError::into_inner).remove(info_hash);

        let Some(swarm) = swarm else {
            return Ok(());
        };

        swarm.addition.abort();

        if self.session.get(torrent_id(info_hash)).is_none() {
            return Ok(());
        }

        self.session
            .delete(torrent_id(info_hash), false)
            .await
            .map_err(|err| Error::RemoveFailed {
                info_hash: *info_hash,
                reason: format!("{err:#}"),
            })
    }

    fn stats(&self, info_hash: &InfoHash) -> Option<SwarmStats> {
        let handle = self.resolved_handle(info_hash)?;

        let stats = handle.stats();

        Some(SwarmStats {
            name: handle.name(),
            uploaded_bytes: stats.uploaded_bytes,
            peers: stats.live.as_ref().map_or(0, |live| live.snapshot.peer_stats.live),
            completed_bytes: stats.progress_bytes,
            total_bytes: stats.total_bytes,
        })
    }

    fn trackers(&self, info_hash: &InfoHash) -> Vec<Url> {
        let swarms = self.swarms.lock().unwrap_or_else(PoisonError::into_inner);

        swarms.get(info_hash).map(|swarm| swarm.trackers.clone()).unwrap_or_default()
    }

    async fn reannounce_to_trackers(&self, info_hash: &InfoHash) -> Result<(), Error> {
        let failed = |reason: String| Error::AnnounceFailed {
            info_hash: *info_hash,
            target: "trackers".to_owned(),
            reason,
        };

        let handle = self.resolved_handle(info_hash).ok_or(Error::UnknownSwarm { info_hash: *info_hash })?;

        self.session
            .pause(&handle)
            .await
            .map_err(|err| failed(format!("could not pause the swarm: {err:#}")))?;

        self.session
            .unpause(&handle)
            .await
            .map_err(|err| failed(format!("could not start the swarm again: {err:#}")))
    }

    async fn announce_to_dht(&self, info_hash: &InfoHash, port: u16) -> Result<(), Error> {
        let dht = self.session.get_dht().ok_or_else(|| Error::AnnounceFailed {
            info_hash: *info_hash,
            target: "DHT".to_owned(),
            reason: "the DHT is disabled".to_owned(),
        })?;

        let mut peers = std::pin::pin!(dht.get_peers(Id20::new(info_hash.0), Some(port)));

        // Polling the stream is what sends the announce; the first answer is enough.
        let _unused = tokio::time::timeout(DHT_ANNOUNCE_TIMEOUT, peers.next()).await;

        Ok(())
    }

    fn listen_port(&self) -> Option<u16> {
        self.session.tcp_listen_port()
    }
}
