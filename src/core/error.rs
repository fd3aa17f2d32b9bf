//! Errors that end a seeding job.
//!
//! Error | Stage | Description
//! ---|---|---
//! `InvalidSource` | `Pending` | The configured source is not a `http(s)` descriptor URL nor a magnet link.
//! `Acquisition` | `AcquiringMetadata` | The descriptor could not be downloaded, cached or parsed.
//! `Engine` | any | The swarm engine refused the swarm or could not complete it.
//! `MetadataTimeout` | `AcquiringMetadata` | The engine did not resolve the metadata in time.
//! `Registry` | any | The job state machine refused a transition.
//!
//! All of them are scoped to one job: the job is marked as failed and every
//! other job goes on.
use std::time::Duration;

use torrust_seeder_primitives::info_hash::InfoHash;

use super::{metadata, registry, source};
use crate::engine;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{source}")]
    InvalidSource {
        #[from]
        source: source::Error,
    },

    #[error("{source}")]
    Acquisition {
        #[from]
        source: metadata::Error,
    },

    #[error("{source}")]
    Engine {
        #[from]
        source: engine::Error,
    },

    #[error("the metadata of swarm {info_hash} was not available after {}s", timeout.as_secs_f64())]
    MetadataTimeout { info_hash: InfoHash, timeout: Duration },

    #[error("{source}")]
    Registry {
        #[from]
        source: registry::Error,
    },
}
