//! Primitive types for [Torrust Seeder](https://docs.rs/torrust-seeder).
//!
//! This module contains the basic data structures shared by the seeder crate
//! and its packages:
//!
//! - [`InfoHash`](info_hash::InfoHash): the identity of a swarm.
//! - [`JobId`](job::JobId) and [`JobState`](job::JobState): the lifecycle of
//!   one seeding job.
//! - [`SwarmStats`](swarm::SwarmStats) and
//!   [`PeerPressureSample`](swarm::PeerPressureSample): the figures the swarm
//!   engine reports for a job.
pub mod info_hash;
pub mod job;
pub mod swarm;

/// Number of bytes in a mebibyte. Used when logging transfer volumes.
pub const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Converts a byte counter into mebibytes for human readable logs.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn as_mib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MIB
}
