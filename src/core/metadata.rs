//! Metadata acquisition.
//!
//! The [`Acquirer`] turns a [`Source`] into something the swarm engine can
//! load:
//!
//! - Magnet links are passed through. The engine resolves the metadata from
//!   the swarm and nothing is cached.
//! - Descriptor URLs are cached in the data directory, under the last segment
//!   of the URL path. When the cached file exists it is used as is. Otherwise
//!   the descriptor is downloaded once, written to a unique temporary file and
//!   renamed into place, so a concurrent reader never sees a partial file.
//!
//! Every error is scoped to the job that asked for the metadata.
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::fs;
use url::Url;
use uuid::Uuid;

use super::descriptor::{self, Descriptor};
use super::source::{DescriptorUrl, MagnetLink, Source};

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not build the HTTP client: {source}")]
    HttpClient { source: reqwest::Error },

    #[error("could not download the descriptor {url}: {source}")]
    Http { url: Url, source: reqwest::Error },

    #[error("the descriptor {url} could not be downloaded, the server answered {status}")]
    Status { url: Url, status: reqwest::StatusCode },

    #[error("descriptor cache I/O error on {path}: {source}")]
    CacheIo { path: PathBuf, source: std::io::Error },

    #[error("the descriptor {path} is malformed, delete it to download it again: {source}")]
    MalformedDescriptor { path: PathBuf, source: descriptor::Error },
}

/// Swarm metadata ready to be handed over to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    Descriptor(Descriptor),
    Magnet(MagnetLink),
}

pub struct Acquirer {
    cache_dir: PathBuf,
    client: reqwest::Client,
}

impl Acquirer {
    /// # Errors
    ///
    /// Will return an error if the HTTP client can not be built.
    pub fn new(cache_dir: impl Into<PathBuf>, http_timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|source| Error::HttpClient { source })?;

        Ok(Self {
            cache_dir: cache_dir.into(),
            client,
        })
    }

    /// Resolves the source into loadable metadata.
    ///
    /// # Errors
    ///
    /// Will return an error if the descriptor can not be downloaded, cached or
    /// parsed.
    pub async fn acquire(&self, source: &Source) -> Result<Metadata, Error> {
        match source {
            Source::Magnet(magnet) => Ok(Metadata::Magnet(magnet.clone())),
            Source::Descriptor(url) => Ok(Metadata::Descriptor(self.fetch_descriptor(url).await?)),
        }
    }

    /// Where the descriptor of `url` is cached.
    #[must_use]
    pub fn cache_path(&self, url: &DescriptorUrl) -> PathBuf {
        self.cache_dir.join(url.file_name())
    }

    async fn fetch_descriptor(&self, url: &DescriptorUrl) -> Result<Descriptor, Error> {
        let path = self.cache_path(url);

        let cached = fs::try_exists(&path).await.map_err(|source| Error::CacheIo {
            path: path.clone(),
            source,
        })?;

        if cached {
            tracing::debug!(url = %url.url(), path = %path.display(), "using the cached descriptor");
        } else {
            let bytes = self.download(url.url()).await?;

            self.write_atomically(&path, &bytes).await?;

            tracing::info!(url = %url.url(), path = %path.display(), bytes = bytes.len(), "descriptor downloaded");
        }

        let bytes = fs::read(&path).await.map_err(|source| Error::CacheIo {
            path: path.clone(),
            source,
        })?;

        Descriptor::from_bytes(bytes).map_err(|source| Error::MalformedDescriptor { path, source })
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>, Error> {
        let response = self.client.get(url.clone()).send().await.map_err(|source| Error::Http {
            url: url.clone(),
            source,
        })?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::Status { url: url.clone(), status });
        }

        let body = response.bytes().await.map_err(|source| Error::Http {
            url: url.clone(),
            source,
        })?;

        Ok(body.to_vec())
    }

    async fn write_atomically(&self, path: &Path, bytes: &[u8]) -> Result<(), Error> {
        let file_name = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();

        let temp_path = self.cache_dir.join(format!(".{file_name}.{}.part", Uuid::new_v4()));

        let result = match fs::write(&temp_path, bytes).await {
            Ok(()) => fs::rename(&temp_path, path).await,
            Err(err) => Err(err),
        };

        if let Err(source) = result {
            let _unused = fs::remove_file(&temp_path).await;

            return Err(Error::CacheIo {
                path: path.to_path_buf(),
                source,
            });
        }

        Ok(())
    }
}
