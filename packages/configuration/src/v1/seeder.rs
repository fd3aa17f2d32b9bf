use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::validator::{SemanticValidationError, Validator};

/// What the seeder keeps alive and where it stores its files.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Seeder {
    /// Directory for the cached descriptors, the downloaded content and the
    /// stats file. It is created on startup if it does not exist.
    #[serde(default = "Seeder::default_data_dir")]
    pub data_dir: Utf8PathBuf,

    /// Sources to seed. Each one is either a `http(s)` URL pointing to a
    /// `.torrent` descriptor or a magnet link.
    #[serde(default = "Seeder::default_sources")]
    pub sources: Vec<String>,

    /// Name of the file, inside `data_dir`, that keeps the total number of
    /// bytes uploaded across all runs.
    #[serde(default = "Seeder::default_stats_file_name")]
    pub stats_file_name: String,
}

impl Default for Seeder {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            sources: Self::default_sources(),
            stats_file_name: Self::default_stats_file_name(),
        }
    }
}

impl Seeder {
    fn default_data_dir() -> Utf8PathBuf {
        Utf8PathBuf::from("./downloads")
    }

    fn default_sources() -> Vec<String> {
        Vec::new()
    }

    fn default_stats_file_name() -> String {
        String::from("seed_stats.txt")
    }

    /// Path of the stats file.
    #[must_use]
    pub fn stats_file_path(&self) -> Utf8PathBuf {
        self.data_dir.join(&self.stats_file_name)
    }

    /// Splits a comma separated list of sources, as given in the command
    /// line, trimming blanks and dropping empty entries.
    #[must_use]
    pub fn parse_source_list(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|source| !source.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}

impl Validator for Seeder {
    fn validate(&self) -> Result<(), SemanticValidationError> {
        if self.sources.iter().all(|source| source.trim().is_empty()) {
            return Err(SemanticValidationError::NoSources);
        }

        if self.stats_file_name.trim().is_empty() {
            return Err(SemanticValidationError::EmptyStatsFileName);
        }

        Ok(())
    }
}
