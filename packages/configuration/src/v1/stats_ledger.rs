use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::validator::{SemanticValidationError, Validator};

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub struct StatsLedger {
    /// Interval in seconds between two flushes of the uploaded bytes to the
    /// stats file.
    #[serde(default = "StatsLedger::default_flush_interval")]
    pub flush_interval: u64,
}

impl Default for StatsLedger {
    fn default() -> Self {
        Self {
            flush_interval: Self::default_flush_interval(),
        }
    }
}

impl StatsLedger {
    fn default_flush_interval() -> u64 {
        30
    }

    #[must_use]
    pub fn flush_interval(&self) -> Duration {
        crate::seconds(self.flush_interval)
    }
}

impl Validator for StatsLedger {
    fn validate(&self) -> Result<(), SemanticValidationError> {
        if self.flush_interval == 0 {
            return Err(SemanticValidationError::ZeroInterval {
                option: "stats_ledger.flush_interval",
            });
        }

        Ok(())
    }
}
