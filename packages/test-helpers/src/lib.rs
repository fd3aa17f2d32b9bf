//! Helpers for testing the Torrust seeder.
pub mod configuration;
pub mod random;
