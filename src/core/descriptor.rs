//! `.torrent` descriptors.
//!
//! Only the fields the seeder needs are read: the `info` dictionary (to
//! compute the info-hash and to check the descriptor is usable), its name and
//! size, and the announce URLs. The original bytes are kept untouched so the
//! engine receives exactly what was downloaded.
//!
//! See [BEP 3: The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html)
//! and [BEP 12: Multitracker Metadata Extension](https://www.bittorrent.org/beps/bep_0012.html).
use std::collections::HashMap;

use serde::Deserialize;
use serde_bencode::value::Value;
use sha1::{Digest, Sha1};
use thiserror::Error;
use torrust_seeder_primitives::info_hash::InfoHash;
use url::Url;

#[derive(Error, Debug)]
pub enum Error {
    #[error("the descriptor is not valid bencode: {source}")]
    InvalidBencode {
        #[from]
        source: serde_bencode::Error,
    },

    #[error("the descriptor `info` field is not a dictionary")]
    InfoIsNotADictionary,

    #[error("the descriptor has no `{field}` field in its `info` dictionary")]
    MissingField { field: &'static str },

    #[error("the descriptor field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

#[derive(Deserialize)]
struct RawDescriptor {
    announce: Option<String>,
    #[serde(rename = "announce-list")]
    announce_list: Option<Vec<Vec<String>>>,
    info: Value,
}

/// A parsed `.torrent` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    bytes: Vec<u8>,
    info_hash: InfoHash,
    name: String,
    total_length: u64,
    trackers: Vec<Url>,
}

impl Descriptor {
    /// Parses and checks a bencoded descriptor.
    ///
    /// # Errors
    ///
    /// Will return an error if the bytes are not a usable descriptor. An empty
    /// or truncated file is an error, never an empty descriptor.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Error> {
        let raw: RawDescriptor = serde_bencode::from_bytes(&bytes)?;

        let Value::Dict(info) = &raw.info else {
            return Err(Error::InfoIsNotADictionary);
        };

        let name = match info.get(b"name".as_slice()) {
            Some(Value::Bytes(name)) => String::from_utf8_lossy(name).into_owned(),
            Some(_) => {
                return Err(Error::InvalidField {
                    field: "name",
                    reason: "expected a byte string".to_owned(),
                })
            }
            None => return Err(Error::MissingField { field: "name" }),
        };

        check_pieces(info)?;

        let total_length = total_length(info)?;

        let info_hash = InfoHash(Sha1::digest(serde_bencode::to_bytes(&raw.info)?).into());

        let trackers = announce_urls(raw.announce, raw.announce_list);

        Ok(Self {
            bytes,
            info_hash,
            name,
            total_length,
            trackers,
        })
    }

    /// The descriptor as it was downloaded.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn info_hash(&self) -> InfoHash {
        self.info_hash
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the whole content in bytes.
    #[must_use]
    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    /// Announce URLs, from `announce-list` first and then `announce`, without
    /// duplicates.
    #[must_use]
    pub fn trackers(&self) -> &[Url] {
        &self.trackers
    }
}

fn check_pieces(info: &HashMap<Vec<u8>, Value>) -> Result<(), Error> {
    match info.get(b"piece length".as_slice()) {
        Some(Value::Int(length)) if *length > 0 => {}
        Some(_) => {
            return Err(Error::InvalidField {
                field: "piece length",
                reason: "expected a positive integer".to_owned(),
            })
        }
        None => return Err(Error::MissingField { field: "piece length" }),
    }

    match info.get(b"pieces".as_slice()) {
        Some(Value::Bytes(pieces)) if !pieces.is_empty() && pieces.len() % 20 == 0 => Ok(()),
        Some(_) => Err(Error::InvalidField {
            field: "pieces",
            reason: "expected a non empty multiple of 20 bytes".to_owned(),
        }),
        None => Err(Error::MissingField { field: "pieces" }),
    }
}

fn total_length(info: &HashMap<Vec<u8>, Value>) -> Result<u64, Error> {
    if let Some(length) = info.get(b"length".as_slice()) {
        return non_negative("length", length);
    }

    let Some(Value::List(files)) = info.get(b"files".as_slice()) else {
        return Err(Error::MissingField { field: "length" });
    };

    files.iter().try_fold(0u64, |total, file| {
        let Value::Dict(file) = file else {
            return Err(Error::InvalidField {
                field: "files",
                reason: "expected a list of dictionaries".to_owned(),
            });
        };

        let length = file.get(b"length".as_slice()).ok_or(Error::MissingField { field: "files.length" })?;

        Ok(total.saturating_add(non_negative("files.length", length)?))
    })
}

fn non_negative(field: &'static str, value: &Value) -> Result<u64, Error> {
    match value {
        Value::Int(length) => u64::try_from(*length).map_err(|_| Error::InvalidField {
            field,
            reason: format!("negative length {length}"),
        }),
        _ => Err(Error::InvalidField {
            field,
            reason: "expected an integer".to_owned(),
        }),
    }
}

fn announce_urls(announce: Option<String>, announce_list: Option<Vec<Vec<String>>>) -> Vec<Url> {
    let mut trackers: Vec<Url> = Vec::new();

    let candidates = announce_list.into_iter().flatten().flatten().chain(announce);

    for candidate in candidates {
        match Url::parse(candidate.trim()) {
            Ok(url) if !trackers.contains(&url) => trackers.push(url),
            Ok(_) => {}
            Err(err) => tracing::debug!(tracker = %candidate, %err, "ignoring invalid announce URL"),
        }
    }

    trackers
}
