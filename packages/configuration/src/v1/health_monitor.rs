use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::validator::{SemanticValidationError, Validator};

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub struct HealthMonitor {
    /// Interval in seconds between two peer count samples.
    #[serde(default = "HealthMonitor::default_interval")]
    pub interval: u64,

    /// A swarm with fewer connected peers than this is announced again to
    /// its trackers and to the DHT.
    #[serde(default = "HealthMonitor::default_peer_floor")]
    pub peer_floor: usize,
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self {
            interval: Self::default_interval(),
            peer_floor: Self::default_peer_floor(),
        }
    }
}

impl HealthMonitor {
    fn default_interval() -> u64 {
        900
    }

    fn default_peer_floor() -> usize {
        10
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        crate::seconds(self.interval)
    }
}

impl Validator for HealthMonitor {
    fn validate(&self) -> Result<(), SemanticValidationError> {
        if self.interval == 0 {
            return Err(SemanticValidationError::ZeroInterval {
                option: "health_monitor.interval",
            });
        }

        Ok(())
    }
}
