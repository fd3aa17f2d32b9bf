//! The list of seeding jobs.
//!
//! Jobs are created once, from the configured sources, and are never removed
//! while the process runs. Only the job supervisor changes them; the periodic
//! jobs read snapshots.
use std::collections::{BTreeMap, HashSet};

use thiserror::Error;
use tokio::sync::RwLock;
use torrust_seeder_primitives::info_hash::InfoHash;
use torrust_seeder_primitives::job::{JobId, JobState};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("there is no job {id}")]
    UnknownJob { id: JobId },

    #[error("job {id} can not move from {from} to {to}")]
    InvalidTransition { id: JobId, from: JobState, to: JobState },
}

/// One seeding job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    /// The configured source, as written in the configuration.
    pub source: String,
    /// The swarm identity, once the engine accepted the swarm.
    pub info_hash: Option<InfoHash>,
    pub state: JobState,
    /// The swarm name, once the metadata is known.
    pub name: Option<String>,
    /// Why the job failed.
    pub failure: Option<String>,
}

impl Job {
    fn new(id: JobId, source: String) -> Self {
        Self {
            id,
            source,
            info_hash: None,
            state: JobState::default(),
            name: None,
            failure: None,
        }
    }

    /// The name to use in logs: the swarm name or, while it is unknown, the
    /// source.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.source)
    }
}

/// A swarm that the engine is working on, on behalf of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSwarm {
    pub job: JobId,
    pub info_hash: InfoHash,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct Registry {
    jobs: RwLock<BTreeMap<JobId, Job>>,
}

impl Registry {
    /// One `Pending` job per non blank source, numbered in order.
    #[must_use]
    pub fn from_sources(sources: &[String]) -> Self {
        let jobs = sources
            .iter()
            .map(|source| source.trim())
            .filter(|source| !source.is_empty())
            .enumerate()
            .map(|(index, source)| (JobId(index), Job::new(JobId(index), source.to_owned())))
            .collect();

        Self { jobs: RwLock::new(jobs) }
    }

    pub async fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// A copy of every job, ordered by id.
    pub async fn snapshot(&self) -> Vec<Job> {
        self.jobs.read().await.values().cloned().collect()
    }

    /// Moves a job to the next state.
    ///
    /// # Errors
    ///
    /// Will return an error if the job does not exist or the state machine
    /// does not allow the transition.
    pub async fn advance(&self, id: JobId, next: JobState) -> Result<(), Error> {
        let mut jobs = self.jobs.write().await;

        let job = jobs.get_mut(&id).ok_or(Error::UnknownJob { id })?;

        if !job.state.can_advance_to(next) {
            return Err(Error::InvalidTransition {
                id,
                from: job.state,
                to: next,
            });
        }

        job.state = next;

        Ok(())
    }

    /// Marks the job as failed. It returns `false` if the job was already
    /// failed or does not exist; the first failure reason is kept.
    pub async fn fail(&self, id: JobId, reason: String) -> bool {
        let mut jobs = self.jobs.write().await;

        match jobs.get_mut(&id) {
            Some(job) if job.state.can_advance_to(JobState::Failed) => {
                job.state = JobState::Failed;
                job.failure = Some(reason);
                true
            }
            _ => false,
        }
    }

    /// # Errors
    ///
    /// Will return an error if the job does not exist.
    pub async fn set_identity(&self, id: JobId, info_hash: InfoHash) -> Result<(), Error> {
        let mut jobs = self.jobs.write().await;

        jobs.get_mut(&id).ok_or(Error::UnknownJob { id })?.info_hash = Some(info_hash);

        Ok(())
    }

    /// # Errors
    ///
    /// Will return an error if the job does not exist.
    pub async fn set_name(&self, id: JobId, name: String) -> Result<(), Error> {
        let mut jobs = self.jobs.write().await;

        jobs.get_mut(&id).ok_or(Error::UnknownJob { id })?.name = Some(name);

        Ok(())
    }

    /// The swarms of the active jobs. Two jobs pointing at the same swarm
    /// share one engine counter, so each swarm is listed once, under the
    /// lowest job id.
    pub async fn active_swarms(&self) -> Vec<ActiveSwarm> {
        let jobs = self.jobs.read().await;

        let mut seen = HashSet::new();

        jobs.values()
            .filter(|job| job.state.is_active())
            .filter_map(|job| job.info_hash.map(|info_hash| (job, info_hash)))
            .filter(|(_, info_hash)| seen.insert(*info_hash))
            .map(|(job, info_hash)| ActiveSwarm {
                job: job.id,
                info_hash,
                name: job.display_name().to_owned(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use torrust_seeder_primitives::info_hash::InfoHash;
    use torrust_seeder_primitives::job::{JobId, JobState};

    use super::{Error, Registry};

    fn sources(list: &[&str]) -> Vec<String> {
        list.iter().map(|source| (*source).to_owned()).collect()
    }

    #[tokio::test]
    async fn it_should_create_one_pending_job_per_non_blank_source() {
        let registry = Registry::from_sources(&sources(&["a", "  ", "b"]));

        let jobs = registry.snapshot().await;

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].id, JobId(1));
        assert_eq!(jobs[1].source, "b");
        assert!(jobs.iter().all(|job| job.state == JobState::Pending));
    }

    #[tokio::test]
    async fn it_should_reject_skipping_states() {
        let registry = Registry::from_sources(&sources(&["a"]));

        let err = registry.advance(JobId(0), JobState::Seeding).await.unwrap_err();

        assert_eq!(
            err,
            Error::InvalidTransition {
                id: JobId(0),
                from: JobState::Pending,
                to: JobState::Seeding
            }
        );
    }

    #[tokio::test]
    async fn a_failed_job_should_keep_its_first_failure() {
        let registry = Registry::from_sources(&sources(&["a"]));

        assert!(registry.fail(JobId(0), "first".to_owned()).await);
        assert!(!registry.fail(JobId(0), "second".to_owned()).await);
        assert!(registry.advance(JobId(0), JobState::AcquiringMetadata).await.is_err());

        let job = registry.get(JobId(0)).await.unwrap();

        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.failure.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn failing_one_job_should_not_change_the_others() {
        let registry = Registry::from_sources(&sources(&["a", "b"]));
        registry.advance(JobId(1), JobState::AcquiringMetadata).await.unwrap();

        registry.fail(JobId(0), "boom".to_owned()).await;

        assert_eq!(registry.get(JobId(1)).await.unwrap().state, JobState::AcquiringMetadata);
    }

    #[tokio::test]
    async fn active_swarms_should_only_list_active_jobs_with_an_identity_once() {
        let registry = Registry::from_sources(&sources(&["a", "b", "c", "d"]));
        let shared = InfoHash([1; 20]);

        for id in [JobId(0), JobId(1), JobId(2)] {
            registry.advance(id, JobState::AcquiringMetadata).await.unwrap();
        }
        registry.set_identity(JobId(0), shared).await.unwrap();
        registry.set_identity(JobId(1), shared).await.unwrap();
        registry.set_name(JobId(0), "shared.iso".to_owned()).await.unwrap();
        // Known swarm, but the job is still pending.
        registry.set_identity(JobId(3), InfoHash([3; 20])).await.unwrap();

        let swarms = registry.active_swarms().await;

        assert_eq!(swarms.len(), 1);
        assert_eq!(swarms[0].job, JobId(0));
        assert_eq!(swarms[0].name, "shared.iso");
    }
}
