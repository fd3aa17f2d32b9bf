//! Setup for the main seeder application.
//!
//! The [`setup`] only builds the application and its dependencies but it does
//! not start the jobs.
//!
//! Setup steps:
//!
//! 1. Load the configuration and apply the command line overrides.
//! 2. Initialize logging.
//! 3. Create the data directory.
//! 4. Start the swarm engine.
//! 5. Build the [`Seeder`] context: open the stats ledger and create the jobs.
//!
//! Every error returned here is fatal: nothing has been started yet.
use std::panic::Location;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use torrust_seeder_configuration::Configuration;

use super::config::{initialize_configuration, Args};
use crate::bootstrap;
use crate::core::{metadata, Seeder};
use crate::engine::{self, SwarmEngineHandle};

#[derive(Error, Debug)]
pub enum Error {
    #[error("{source}")]
    Configuration {
        #[from]
        source: torrust_seeder_configuration::Error,
    },

    #[error("could not create the data directory {path}: {source}, {location}")]
    DataDir {
        path: Utf8PathBuf,
        source: std::io::Error,
        location: &'static Location<'static>,
    },

    #[error("{source}")]
    Acquirer {
        #[from]
        source: metadata::Error,
    },

    #[error("no swarm engine was compiled in, build the seeder with the `rqbit` feature, {location}")]
    NoSwarmEngine { location: &'static Location<'static> },

    #[error("the swarm engine could not be started: {source}")]
    Engine { source: engine::Error },
}

/// It loads the configuration, starts the swarm engine and builds the
/// application context.
///
/// # Errors
///
/// Will return an error if any of the setup steps fails.
pub async fn setup(args: &Args) -> Result<(Arc<Configuration>, Arc<Seeder>), Error> {
    let configuration = Arc::new(initialize_configuration(args)?);

    initialize_logging(&configuration);

    ensure_data_dir(&configuration.seeder.data_dir).await?;

    let engine = initialize_engine(&configuration).await?;

    let seeder = initialize_with_configuration(&configuration, engine).await?;

    Ok((configuration, seeder))
}

/// It builds the application context with an engine that is already running.
///
/// # Errors
///
/// Will return an error if the data directory can not be created or the
/// HTTP client can not be built.
pub async fn initialize_with_configuration(
    configuration: &Arc<Configuration>,
    engine: SwarmEngineHandle,
) -> Result<Arc<Seeder>, Error> {
    initialize_logging(configuration);

    ensure_data_dir(&configuration.seeder.data_dir).await?;

    let seeder = Seeder::new(configuration.clone(), engine).await?;

    tracing::info!(
        data_dir = %configuration.seeder.data_dir,
        jobs = seeder.registry().len().await,
        "seeder initialized"
    );

    Ok(Arc::new(seeder))
}

pub fn initialize_logging(configuration: &Configuration) {
    bootstrap::logging::setup(&configuration.logging);
}

async fn ensure_data_dir(path: &Utf8PathBuf) -> Result<(), Error> {
    let location = Location::caller();

    tokio::fs::create_dir_all(path).await.map_err(|source| Error::DataDir {
        path: path.clone(),
        source,
        location,
    })
}

#[cfg(feature = "rqbit")]
async fn initialize_engine(configuration: &Configuration) -> Result<SwarmEngineHandle, Error> {
    let engine = engine::rqbit::RqbitEngine::start(configuration.seeder.data_dir.clone().into_std_path_buf(), &configuration.engine)
        .await
        .map_err(|source| Error::Engine { source })?;

    tracing::info!(listen_port = ?engine::SwarmEngine::listen_port(&engine), "librqbit swarm engine started");

    Ok(Arc::new(engine))
}

#[cfg(not(feature = "rqbit"))]
#[allow(clippy::unused_async)]
async fn initialize_engine(_configuration: &Configuration) -> Result<SwarmEngineHandle, Error> {
    Err(Error::NoSwarmEngine {
        location: Location::caller(),
    })
}
