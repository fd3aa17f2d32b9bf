//! Initialize configuration from the config file, the environment and the
//! command line.
//!
//! Configuration sources, from lowest to highest priority:
//!
//! 1. The `seeder.toml` file (`--config-path` or
//!    `TORRUST_SEEDER_CONFIG_TOML_PATH`).
//! 2. The `TORRUST_SEEDER_CONFIG_TOML` env var with the whole file content.
//! 3. Single option env vars like `TORRUST_SEEDER_SEEDER__DATA_DIR`.
//! 4. The command line flags `--dir` and `--url`, or their env vars
//!    `DOWNLOAD_DIR` and `TORRENT_URLS`.
//!
//! Refer to the [configuration documentation](https://docs.rs/torrust-seeder-configuration) for the configuration options.
use camino::Utf8PathBuf;
use clap::Parser;
use torrust_seeder_configuration::validator::Validator;
use torrust_seeder_configuration::{Configuration, Error, Info, Seeder, DEFAULT_PATH_CONFIG};

/// Keeps a set of `BitTorrent` swarms seeded.
#[derive(Parser, Debug, Default, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Directory for the downloaded descriptors, the content and the stats
    /// file.
    #[clap(long, env = "DOWNLOAD_DIR")]
    pub dir: Option<Utf8PathBuf>,

    /// Comma separated list of `.torrent` URLs and magnet links.
    #[clap(long = "url", env = "TORRENT_URLS", hide_env_values = true)]
    pub urls: Option<String>,

    /// Path to the TOML configuration file.
    #[clap(long, env = "TORRUST_SEEDER_CONFIG_TOML_PATH")]
    pub config_path: Option<Utf8PathBuf>,
}

/// It loads the application configuration and applies the command line
/// overrides.
///
/// # Errors
///
/// Will return an error if the configuration can not be loaded or if it is
/// not valid, for example when there is nothing to seed.
pub fn initialize_configuration(args: &Args) -> Result<Configuration, Error> {
    let info = match &args.config_path {
        Some(path) => Info::from_path(path.to_string()),
        None => Info::new(DEFAULT_PATH_CONFIG.to_owned()),
    };

    let mut config = Configuration::load(&info)?;

    apply_overrides(&mut config, args);

    config.validate()?;

    Ok(config)
}

fn apply_overrides(config: &mut Configuration, args: &Args) {
    if let Some(dir) = &args.dir {
        config.seeder.data_dir.clone_from(dir);
    }

    if let Some(urls) = &args.urls {
        config.seeder.sources = Seeder::parse_source_list(urls);
    }
}
