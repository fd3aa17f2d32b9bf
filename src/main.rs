use std::process::ExitCode;

use clap::Parser;
use torrust_seeder::bootstrap::config::Args;
use torrust_seeder::shutdown::Shutdown;
use torrust_seeder::{app, bootstrap};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let (_config, seeder) = match bootstrap::app::setup(&args).await {
        Ok(setup) => setup,
        Err(err) => {
            tracing::error!(%err, "the seeder could not start");
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();

    let signals = shutdown.listen_for_os_signals();

    app::run(seeder, shutdown).await;

    signals.abort();

    ExitCode::SUCCESS
}
