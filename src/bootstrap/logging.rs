//! Setup for the application logging.
//!
//! It redirects the tracing events to the standard output with the threshold
//! and style defined in the `[logging]` section of the configuration.
//!
//! - `off` (i.e. don't load any subscriber...)
//! - `error`
//! - `warn`
//! - `info`
//! - `debug`
//! - `trace`
//!
//! Refer to the [configuration crate documentation](https://docs.rs/torrust-seeder-configuration) to know how to change logging settings.
use std::sync::Once;

use torrust_seeder_configuration::{Logging, Threshold, TraceStyle};
use tracing::debug;
use tracing::level_filters::LevelFilter;

static INIT: Once = Once::new();

/// It redirects the tracing events to the standard output. It only has effect
/// the first time it is called.
pub fn setup(cfg: &Logging) {
    let filter = map_to_level_filter(cfg.threshold);

    if filter == LevelFilter::OFF {
        return;
    }

    INIT.call_once(|| {
        stdout_init(filter, cfg.style);
    });
}

fn map_to_level_filter(threshold: Threshold) -> LevelFilter {
    match threshold {
        Threshold::Off => LevelFilter::OFF,
        Threshold::Error => LevelFilter::ERROR,
        Threshold::Warn => LevelFilter::WARN,
        Threshold::Info => LevelFilter::INFO,
        Threshold::Debug => LevelFilter::DEBUG,
        Threshold::Trace => LevelFilter::TRACE,
    }
}

fn stdout_init(filter: LevelFilter, style: TraceStyle) {
    let builder = tracing_subscriber::fmt().with_max_level(filter);

    let () = match style {
        TraceStyle::Full => builder.init(),
        // File paths are only useful when debugging.
        TraceStyle::Pretty => builder.pretty().with_file(LevelFilter::DEBUG <= filter).init(),
        TraceStyle::Compact => builder.compact().init(),
        TraceStyle::Json => builder.json().init(),
    };

    debug!(threshold = %filter, %style, "logging initialized");
}
