use derive_more::Constructor;
use serde::{Deserialize, Serialize};

use crate::info_hash::InfoHash;
use crate::job::JobId;

/// Statistics the swarm engine reports for one swarm.
///
/// Every counter is scoped to the current process lifetime: the engine
/// starts them from zero on every restart.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default, Constructor)]
pub struct SwarmStats {
    /// Human readable name from the swarm metadata, once it is known.
    pub name: Option<String>,
    /// Bytes of piece data uploaded to other peers during this session.
    pub uploaded_bytes: u64,
    /// Peers currently connected to the swarm.
    pub peers: usize,
    /// Bytes of verified content on disk.
    pub completed_bytes: u64,
    /// Total size of the content, `0` while the metadata is missing.
    pub total_bytes: u64,
}

impl SwarmStats {
    /// Fraction of the content that is complete, between `0.0` and `1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn completion(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }

        (self.completed_bytes.min(self.total_bytes) as f64) / (self.total_bytes as f64)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_bytes > 0 && self.completed_bytes >= self.total_bytes
    }
}

/// Peer count of one job observed at a health check tick.
///
/// It is never persisted: it only decides whether the job needs a new
/// announce on that tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Constructor)]
pub struct PeerPressureSample {
    pub job: JobId,
    pub info_hash: InfoHash,
    pub peers: usize,
}

impl PeerPressureSample {
    /// A swarm is under-peered when it has strictly fewer peers than the floor.
    #[must_use]
    pub fn is_below(&self, peer_floor: usize) -> bool {
        self.peers < peer_floor
    }
}
