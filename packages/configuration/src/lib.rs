//! Configuration data structures for [Torrust Seeder](https://docs.rs/torrust-seeder).
//!
//! This module contains the configuration data structures for the Torrust
//! Seeder, a long-running process that keeps a set of `BitTorrent` swarms
//! alive.
//!
//! The current version for configuration is [`v1`].
//!
//! The configuration is layered. From lowest to highest priority:
//!
//! 1. Built-in defaults.
//! 2. The TOML file in [`ENV_VAR_CONFIG_TOML_PATH`] (or the default path).
//!    A missing file is not an error.
//! 3. The whole TOML content in [`ENV_VAR_CONFIG_TOML`].
//! 4. Single options in environment variables with the
//!    [`CONFIG_OVERRIDE_PREFIX`] prefix, using [`CONFIG_OVERRIDE_SEPARATOR`] to
//!    separate sections. For example:
//!    `TORRUST_SEEDER_HEALTH_MONITOR__PEER_FLOOR=5`.
pub mod v1;
pub mod validator;

use std::env;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// The whole `seeder.toml` file content. It has priority over the config file.
/// Even if the file is not on the default path.
pub const ENV_VAR_CONFIG_TOML: &str = "TORRUST_SEEDER_CONFIG_TOML";

/// The `seeder.toml` file location.
pub const ENV_VAR_CONFIG_TOML_PATH: &str = "TORRUST_SEEDER_CONFIG_TOML_PATH";

/// Prefix for env vars that overwrite single configuration options.
pub const CONFIG_OVERRIDE_PREFIX: &str = "TORRUST_SEEDER_";

/// Path separator in env var names for nested values in configuration.
pub const CONFIG_OVERRIDE_SEPARATOR: &str = "__";

/// Default location of the configuration file.
pub const DEFAULT_PATH_CONFIG: &str = "./share/default/config/seeder.toml";

pub type Configuration = v1::Configuration;
pub type Logging = v1::logging::Logging;
pub type Threshold = v1::logging::Threshold;
pub type TraceStyle = v1::logging::TraceStyle;
pub type Seeder = v1::seeder::Seeder;
pub type Metadata = v1::metadata::Metadata;
pub type StatsLedger = v1::stats_ledger::StatsLedger;
pub type HealthMonitor = v1::health_monitor::HealthMonitor;
pub type Engine = v1::engine::Engine;

pub type DynError = Arc<dyn std::error::Error + Send + Sync>;

/// Converts a number of seconds from the configuration into a [`Duration`].
#[must_use]
pub fn seconds(secs: u64) -> Duration {
    Duration::from_secs(secs)
}

/// Information required for loading config
#[derive(Debug, Default, Clone)]
pub struct Info {
    config_toml: Option<String>,
    config_toml_path: String,
}

impl Info {
    /// Build Configuration Info from the environment.
    ///
    /// `default_config_toml_path` is used when [`ENV_VAR_CONFIG_TOML_PATH`]
    /// is not set.
    #[must_use]
    pub fn new(default_config_toml_path: String) -> Self {
        let config_toml = env::var(ENV_VAR_CONFIG_TOML).ok();

        let config_toml_path = env::var(ENV_VAR_CONFIG_TOML_PATH).unwrap_or(default_config_toml_path);

        Self {
            config_toml,
            config_toml_path,
        }
    }

    /// Build Configuration Info pointing to an explicit file.
    #[must_use]
    pub fn from_path(config_toml_path: String) -> Self {
        Self {
            config_toml: env::var(ENV_VAR_CONFIG_TOML).ok(),
            config_toml_path,
        }
    }

    #[must_use]
    pub fn config_toml_path(&self) -> &str {
        &self.config_toml_path
    }

    #[must_use]
    pub fn has_inline_config(&self) -> bool {
        self.config_toml.is_some()
    }
}

/// Errors that can occur when loading the configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// The sources could be merged but the result does not match the
    /// configuration structure.
    #[error("Failed processing the configuration: {source}, {location}")]
    ConfigError {
        location: &'static Location<'static>,
        source: DynError,
    },

    #[error("Invalid configuration: {source}")]
    Invalid {
        #[from]
        source: validator::SemanticValidationError,
    },
}

impl From<figment::Error> for Error {
    #[track_caller]
    fn from(err: figment::Error) -> Self {
        Self::ConfigError {
            location: Location::caller(),
            source: Arc::new(err),
        }
    }
}
