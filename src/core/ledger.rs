//! The stats ledger.
//!
//! It keeps the total number of bytes uploaded by every run of the seeder. The
//! total lives in a small text file in the data directory, holding a single
//! decimal number.
//!
//! The swarm engine counters start from zero on every run. The ledger
//! remembers, per swarm, the last counter value it has already added to the
//! total and on every flush it only adds what the counter grew since then:
//!
//! ```text
//! flush N:     counter = 700   baseline = 500   total += 200   baseline = 700
//! flush N + 1: counter = 700   baseline = 700   total += 0
//! ```
//!
//! A counter going backwards moves the baseline down without adding anything.
//!
//! Flushes never overlap: the ledger state is locked for the whole flush,
//! including the file write.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use torrust_seeder_primitives::as_mib;
use torrust_seeder_primitives::info_hash::InfoHash;
use uuid::Uuid;

use super::registry::ActiveSwarm;
use crate::engine::SwarmEngine;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not persist the stats file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

/// The persisted record.
#[derive(Debug, Clone)]
pub struct StatsFile {
    path: PathBuf,
}

impl StatsFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted total. A missing or unreadable file counts as `0`.
    pub async fn read(&self) -> u64 {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "could not read the stats file, starting from 0");
                return 0;
            }
        };

        match contents.split_whitespace().next().map(str::parse::<u64>) {
            Some(Ok(total)) => total,
            _ => {
                tracing::warn!(path = %self.path.display(), "the stats file does not hold a byte counter, starting from 0");
                0
            }
        }
    }

    /// Replaces the persisted total. The new value is written to a temporary
    /// file next to the record and renamed over it, so the record is never
    /// left half written.
    ///
    /// # Errors
    ///
    /// Will return an error if the temporary file can not be written or
    /// renamed.
    pub async fn write(&self, total: u64) -> Result<(), Error> {
        let temp_path = self.temp_path();

        let result = match fs::write(&temp_path, total.to_string()).await {
            Ok(()) => fs::rename(&temp_path, &self.path).await,
            Err(err) => Err(err),
        };

        if let Err(source) = result {
            let _unused = fs::remove_file(&temp_path).await;

            return Err(Error::Io {
                path: self.path.clone(),
                source,
            });
        }

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()))
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    cumulative: u64,
    session: u64,
    baselines: HashMap<InfoHash, u64>,
}

pub struct StatsLedger {
    file: StatsFile,
    state: Mutex<LedgerState>,
}

impl StatsLedger {
    /// Opens the ledger, starting from the persisted total.
    pub async fn open(file: StatsFile) -> Self {
        let cumulative = file.read().await;

        tracing::info!(path = %file.path().display(), "Stats ledger opened, uploaded so far: {:.2} MB", as_mib(cumulative));

        Self {
            file,
            state: Mutex::new(LedgerState {
                cumulative,
                ..LedgerState::default()
            }),
        }
    }

    #[must_use]
    pub fn file(&self) -> &StatsFile {
        &self.file
    }

    /// Bytes uploaded by every run, including what has not been persisted
    /// yet because the last write failed.
    pub async fn cumulative_uploaded(&self) -> u64 {
        self.state.lock().await.cumulative
    }

    /// Bytes added to the total during this run.
    pub async fn session_uploaded(&self) -> u64 {
        self.state.lock().await.session
    }

    /// Adds the bytes uploaded since the previous flush and persists the new
    /// total. It returns the total.
    ///
    /// # Errors
    ///
    /// Will return an error if the total can not be persisted. The total is
    /// kept in memory and written again on the next flush.
    pub async fn flush(&self, engine: &dyn SwarmEngine, swarms: &[ActiveSwarm]) -> Result<u64, Error> {
        let mut state = self.state.lock().await;

        for swarm in swarms {
            let Some(stats) = engine.stats(&swarm.info_hash) else {
                tracing::debug!(job = %swarm.job, info_hash = %swarm.info_hash, "the engine has no stats for the swarm");
                continue;
            };

            let baseline = state.baselines.insert(swarm.info_hash, stats.uploaded_bytes).unwrap_or(0);

            let delta = stats.uploaded_bytes.saturating_sub(baseline);

            state.cumulative = state.cumulative.saturating_add(delta);
            state.session = state.session.saturating_add(delta);

            tracing::info!(
                job = %swarm.job,
                info_hash = %swarm.info_hash,
                peers = stats.peers,
                "{} - {} peers - Uploaded this run: {:.2} MB",
                stats.name.as_deref().unwrap_or(&swarm.name),
                stats.peers,
                as_mib(stats.uploaded_bytes)
            );
        }

        tracing::info!("Total uploaded: {:.2} MB (all runs)", as_mib(state.cumulative));

        self.file.write(state.cumulative).await?;

        Ok(state.cumulative)
    }
}
