//! Trait to validate semantic errors.
//!
//! Errors could involve more than one configuration option. Some values are
//! well formed but make no sense for a running seeder, like an empty list of
//! sources or an interval of zero seconds.
use thiserror::Error;

/// Errors that can occur validating the configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SemanticValidationError {
    #[error("No torrent URLs or magnet links provided. Set the `--url` flag or the `TORRENT_URLS` environment variable.")]
    NoSources,

    #[error("The stats file name can not be empty.")]
    EmptyStatsFileName,

    #[error("The option `{option}` must be greater than zero.")]
    ZeroInterval { option: &'static str },

    #[error("The engine listening ports {start}..{end} are an empty range.")]
    EmptyPortRange { start: u16, end: u16 },
}

pub trait Validator {
    /// # Errors
    ///
    /// Will return an error if the configuration is invalid.
    fn validate(&self) -> Result<(), SemanticValidationError>;
}
