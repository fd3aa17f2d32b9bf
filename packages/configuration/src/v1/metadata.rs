use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::validator::{SemanticValidationError, Validator};

/// Timeouts used while acquiring the swarm metadata.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub struct Metadata {
    /// Seconds a job waits for the engine to resolve the swarm metadata
    /// before it is marked as failed.
    #[serde(default = "Metadata::default_timeout")]
    pub timeout: u64,

    /// Seconds allowed for downloading a `.torrent` descriptor.
    #[serde(default = "Metadata::default_http_timeout")]
    pub http_timeout: u64,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            timeout: Self::default_timeout(),
            http_timeout: Self::default_http_timeout(),
        }
    }
}

impl Metadata {
    fn default_timeout() -> u64 {
        30
    }

    fn default_http_timeout() -> u64 {
        60
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        crate::seconds(self.timeout)
    }

    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        crate::seconds(self.http_timeout)
    }
}

impl Validator for Metadata {
    fn validate(&self) -> Result<(), SemanticValidationError> {
        if self.timeout == 0 {
            return Err(SemanticValidationError::ZeroInterval {
                option: "metadata.timeout",
            });
        }

        if self.http_timeout == 0 {
            return Err(SemanticValidationError::ZeroInterval {
                option: "metadata.http_timeout",
            });
        }

        Ok(())
    }
}
