//! Seeder configuration factories for testing.
use std::path::Path;

use camino::Utf8PathBuf;
use torrust_seeder_configuration::{Configuration, Threshold};

use crate::random;

/// This configuration is used for testing. It keeps every file inside
/// `data_dir`, turns logging off and shortens the metadata timeouts.
///
/// # Panics
///
/// Will panic if `data_dir` is not valid UTF-8.
#[must_use]
pub fn ephemeral(data_dir: &Path, sources: Vec<String>) -> Configuration {
    let mut config = Configuration::default();

    config.logging.threshold = Threshold::Off; // Change to `debug` for tests debugging

    config.seeder.data_dir = Utf8PathBuf::from_path_buf(data_dir.to_path_buf()).expect("the temp dir path should be valid UTF-8");
    config.seeder.sources = sources;
    config.seeder.stats_file_name = format!("seed_stats_{}.txt", random::string(8));

    config.metadata.timeout = 2;
    config.metadata.http_timeout = 5;

    config
}

/// A magnet link with a random info-hash.
#[must_use]
pub fn random_magnet_link() -> String {
    let hex: String = random::string(40)
        .chars()
        .map(|c| char::from_digit(u32::from(c) % 16, 16).unwrap_or('0'))
        .collect();

    format!("magnet:?xt=urn:btih:{hex}&dn={}", random::string(8))
}
