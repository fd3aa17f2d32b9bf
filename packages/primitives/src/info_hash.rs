use std::panic::Location;

use thiserror::Error;

/// `BitTorrent` Info Hash v1. The identity of a swarm.
///
/// It is the SHA-1 digest of the bencoded `info` dictionary of a descriptor,
/// so it is stable across sessions and across seeders of the same content.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug, PartialOrd, Ord)]
pub struct InfoHash(pub [u8; 20]);

pub const INFO_HASH_BYTES_LEN: usize = 20;

impl InfoHash {
    /// Returns the `InfoHash` internal byte array.
    #[must_use]
    pub fn bytes(&self) -> [u8; INFO_HASH_BYTES_LEN] {
        self.0
    }

    /// Returns the `InfoHash` as a lowercase hex string.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for InfoHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut chars = [0u8; 2 * INFO_HASH_BYTES_LEN];
        let hex = binascii::bin2hex(&self.0, &mut chars).map_err(|_| std::fmt::Error)?;
        f.write_str(std::str::from_utf8(hex).map_err(|_| std::fmt::Error)?)
    }
}

impl std::str::FromStr for InfoHash {
    type Err = ConversionError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 2 * INFO_HASH_BYTES_LEN {
            return Err(ConversionError::InvalidHexLength {
                location: Location::caller(),
                length: s.len(),
            });
        }

        let mut info_hash = Self::default();

        binascii::hex2bin(s.to_ascii_lowercase().as_bytes(), &mut info_hash.0).map_err(|_| ConversionError::InvalidHex {
            location: Location::caller(),
            value: s.to_owned(),
        })?;

        Ok(info_hash)
    }
}

impl From<[u8; INFO_HASH_BYTES_LEN]> for InfoHash {
    fn from(bytes: [u8; INFO_HASH_BYTES_LEN]) -> Self {
        InfoHash(bytes)
    }
}

impl TryFrom<&[u8]> for InfoHash {
    type Error = ConversionError;

    #[track_caller]
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; INFO_HASH_BYTES_LEN] = bytes.try_into().map_err(|_| ConversionError::InvalidByteLength {
            location: Location::caller(),
            length: bytes.len(),
        })?;

        Ok(Self(array))
    }
}

/// Errors that can occur when building an `InfoHash` from untrusted input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("an infohash is {INFO_HASH_BYTES_LEN} bytes long, got {length} bytes, {location}")]
    InvalidByteLength {
        location: &'static Location<'static>,
        length: usize,
    },

    #[error("an hex encoded infohash is 40 characters long, got {length} characters, {location}")]
    InvalidHexLength {
        location: &'static Location<'static>,
        length: usize,
    },

    #[error("invalid hex encoded infohash: {value}, {location}")]
    InvalidHex {
        location: &'static Location<'static>,
        value: String,
    },
}

impl serde::ser::Serialize for InfoHash {
    fn serialize<S: serde::ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> serde::de::Deserialize<'de> for InfoHash {
    fn deserialize<D: serde::de::Deserializer<'de>>(des: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(des)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}
