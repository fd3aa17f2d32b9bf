//! Version `1` for [Torrust Seeder](https://docs.rs/torrust-seeder)
//! configuration data structures.
//!
//! The configuration is loaded from a [TOML](https://toml.io/en/) file
//! `seeder.toml` in the project root folder or from an environment variable
//! with the same content as the file.
//!
//! Every option has a default value, so an empty file is a valid
//! configuration. However, the seeder refuses to start when there are no
//! sources to seed (see [`validator`](crate::validator)).
//!
//! ## Sections
//!
//! - [`logging`]: log threshold and output style.
//! - [`seeder`]: data directory, sources and the name of the stats file.
//! - [`metadata`]: timeouts used while acquiring swarm metadata.
//! - [`stats_ledger`]: how often the uploaded bytes are persisted.
//! - [`health_monitor`]: when under-peered swarms are re-announced.
//! - [`engine`]: options for the swarm engine.
//!
//! ## Default configuration
//!
//! ```toml
//! [logging]
//! threshold = "info"
//! style = "full"
//!
//! [seeder]
//! data_dir = "./downloads"
//! sources = []
//! stats_file_name = "seed_stats.txt"
//!
//! [metadata]
//! timeout = 30
//! http_timeout = 60
//!
//! [stats_ledger]
//! flush_interval = 30
//!
//! [health_monitor]
//! interval = 900
//! peer_floor = 10
//!
//! [engine]
//! dht = true
//! listen_port_start = 4240
//! listen_port_end = 4260
//! upnp_port_forwarding = false
//! ```
pub mod engine;
pub mod health_monitor;
pub mod logging;
pub mod metadata;
pub mod seeder;
pub mod stats_ledger;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use self::engine::Engine;
use self::health_monitor::HealthMonitor;
use self::logging::Logging;
use self::metadata::Metadata;
use self::seeder::Seeder;
use self::stats_ledger::StatsLedger;
use crate::validator::{SemanticValidationError, Validator};
use crate::{Error, Info, CONFIG_OVERRIDE_PREFIX, CONFIG_OVERRIDE_SEPARATOR};

/// Core configuration for the seeder.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Default, Clone)]
pub struct Configuration {
    /// Logging configuration
    #[serde(default)]
    pub logging: Logging,

    /// What to seed and where to keep it.
    #[serde(default)]
    pub seeder: Seeder,

    /// Metadata acquisition configuration.
    #[serde(default)]
    pub metadata: Metadata,

    /// Upload statistics persistence.
    #[serde(default)]
    pub stats_ledger: StatsLedger,

    /// Periodic re-announce of under-peered swarms.
    #[serde(default)]
    pub health_monitor: HealthMonitor,

    /// Swarm engine options.
    #[serde(default)]
    pub engine: Engine,
}

impl Configuration {
    /// Loads the configuration from the configuration file and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the merged sources have a bad configuration.
    pub fn load(info: &Info) -> Result<Configuration, Error> {
        let figment = Self::initialize_figment(info);

        let config: Configuration = figment.extract()?;

        Ok(config)
    }

    fn initialize_figment(info: &Info) -> Figment {
        let figment = Figment::from(Serialized::defaults(Configuration::default())).merge(Toml::file(&info.config_toml_path));

        let figment = match &info.config_toml {
            Some(config_toml) => figment.merge(Toml::string(config_toml)),
            None => figment,
        };

        figment.merge(Env::prefixed(CONFIG_OVERRIDE_PREFIX).split(CONFIG_OVERRIDE_SEPARATOR))
    }

    /// Encodes the configuration to TOML.
    ///
    /// # Panics
    ///
    /// Will panic if it can't be converted to TOML.
    #[must_use]
    pub fn to_toml(&self) -> String {
        // code-review: do we need to use Figment also to serialize into toml?
        toml::to_string(self).expect("Could not encode TOML value")
    }
}

impl Validator for Configuration {
    fn validate(&self) -> Result<(), SemanticValidationError> {
        self.seeder.validate()?;
        self.metadata.validate()?;
        self.stats_ledger.validate()?;
        self.health_monitor.validate()?;
        self.engine.validate()
    }
}
