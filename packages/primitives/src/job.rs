//! The lifecycle of one seeding job.
//!
//! ```text
//! Pending -> AcquiringMetadata -> VerifyingContent -> Seeding
//!    \              \                    \
//!     `--------------`--------------------`------> Failed
//! ```
//!
//! Transitions only move forward. `Failed` can be reached from any
//! non-terminal state and `Seeding` is left only when the process stops.
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Position of the job in the configured list of sources.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("job-{_0}")]
pub struct JobId(pub usize);

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash, Display, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Created from the configuration, nothing has been done yet.
    #[default]
    Pending,
    /// The descriptor is being fetched or the engine is waiting for the
    /// swarm metadata.
    AcquiringMetadata,
    /// The engine was told to download everything and the job waits until
    /// the whole content is present and verified.
    VerifyingContent,
    /// Complete content, the job only uploads from now on.
    Seeding,
    /// Terminal. The job was dropped from active seeding.
    Failed,
}

impl JobState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Failed)
    }

    /// Whether the job counts towards the active jobs: the engine knows its
    /// swarm and it has not been dropped.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(
            self,
            JobState::AcquiringMetadata | JobState::VerifyingContent | JobState::Seeding
        )
    }

    /// Whether the state machine allows moving from `self` to `next`.
    #[must_use]
    pub fn can_advance_to(self, next: JobState) -> bool {
        match (self, next) {
            (JobState::Failed, _) | (JobState::Seeding, JobState::Seeding) => false,
            (_, JobState::Failed) => true,
            (from, to) => to.rank() == from.rank() + 1,
        }
    }

    fn rank(self) -> u8 {
        match self {
            JobState::Pending => 0,
            JobState::AcquiringMetadata => 1,
            JobState::VerifyingContent => 2,
            JobState::Seeding => 3,
            JobState::Failed => u8::MAX,
        }
    }
}
