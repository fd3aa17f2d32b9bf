//! Sources of the seeding jobs.
//!
//! A source is one entry of the configured list. It is either:
//!
//! - A `http` or `https` URL pointing to a `.torrent` descriptor, for example
//!   `https://example.com/ubuntu-24.04-live-server-amd64.iso.torrent`.
//! - A magnet link, for example
//!   `magnet:?xt=urn:btih:9c38422213e30bff212b30c360d26f9a02136422&dn=ubuntu`.
use std::panic::Location;
use std::str::FromStr;

use thiserror::Error;
use torrust_seeder_primitives::info_hash::InfoHash;
use url::Url;

const MAGNET_PREFIX: &str = "magnet:?";
const BTIH_URN_PREFIX: &str = "urn:btih:";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid source `{source_str}`: {reason}, {location}")]
    InvalidUrl {
        source_str: String,
        reason: String,
        location: &'static Location<'static>,
    },

    #[error("unsupported scheme `{scheme}` in source `{source_str}`, expected `http`, `https` or `magnet`")]
    UnsupportedScheme { source_str: String, scheme: String },

    #[error("the descriptor URL `{source_str}` has no file name to cache it with")]
    MissingFileName { source_str: String },

    #[error("the magnet link `{source_str}` has no `xt=urn:btih:` parameter")]
    MissingInfoHash { source_str: String },
}

/// Where the swarm metadata comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A `.torrent` descriptor to download over HTTP(S).
    Descriptor(DescriptorUrl),
    /// A magnet link, the metadata comes from the swarm itself.
    Magnet(MagnetLink),
}

impl FromStr for Source {
    type Err = Error;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.starts_with(MAGNET_PREFIX) {
            return Ok(Source::Magnet(s.parse()?));
        }

        Ok(Source::Descriptor(s.parse()?))
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Descriptor(url) => write!(f, "{}", url.url),
            Source::Magnet(magnet) => write!(f, "{}", magnet.uri),
        }
    }
}

/// A `http(s)` URL of a `.torrent` descriptor, with the final path segment
/// used as the name of the cached copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorUrl {
    url: Url,
    file_name: String,
}

impl DescriptorUrl {
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Name of the cached descriptor file.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl FromStr for DescriptorUrl {
    type Err = Error;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s).map_err(|err| Error::InvalidUrl {
            source_str: s.to_owned(),
            reason: err.to_string(),
            location: Location::caller(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::UnsupportedScheme {
                source_str: s.to_owned(),
                scheme: url.scheme().to_owned(),
            });
        }

        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
            .map(ToOwned::to_owned)
            .ok_or_else(|| Error::MissingFileName { source_str: s.to_owned() })?;

        Ok(Self { url, file_name })
    }
}

/// A magnet link. The info-hash is extracted when it is hex encoded; base32
/// encoded hashes are left to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnetLink {
    uri: String,
    info_hash: Option<InfoHash>,
    display_name: Option<String>,
    trackers: Vec<Url>,
}

impl MagnetLink {
    /// The whole magnet link, as configured.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn info_hash(&self) -> Option<InfoHash> {
        self.info_hash
    }

    /// The `dn` parameter.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// The `tr` parameters that are valid URLs.
    #[must_use]
    pub fn trackers(&self) -> &[Url] {
        &self.trackers
    }
}

impl FromStr for MagnetLink {
    type Err = Error;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s).map_err(|err| Error::InvalidUrl {
            source_str: s.to_owned(),
            reason: err.to_string(),
            location: Location::caller(),
        })?;

        let mut exact_topic = None;
        let mut display_name = None;
        let mut trackers = Vec::new();

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "xt" if value.starts_with(BTIH_URN_PREFIX) => exact_topic = Some(value[BTIH_URN_PREFIX.len()..].to_owned()),
                "dn" => display_name = Some(value.into_owned()),
                "tr" => {
                    if let Ok(tracker) = Url::parse(&value) {
                        trackers.push(tracker);
                    }
                }
                _ => {}
            }
        }

        let exact_topic = exact_topic.ok_or_else(|| Error::MissingInfoHash { source_str: s.to_owned() })?;

        Ok(Self {
            uri: s.to_owned(),
            info_hash: InfoHash::from_str(&exact_topic).ok(),
            display_name,
            trackers,
        })
    }
}
