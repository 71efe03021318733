use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Length of a raw SHA-1 digest in bytes.
pub const RAW_LEN: usize = 20;

/// Length of a hex-rendered identifier.
pub const HEX_LEN: usize = RAW_LEN * 2;

/// Content-addressed identifier for any stored object.
///
/// An `ObjectId` is the SHA-1 digest of an object's framed bytes
/// (`<kind> <len>\0<payload>`). Identical framed bytes always produce the same
/// `ObjectId`. The textual form is always 40 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; RAW_LEN]);

impl ObjectId {
    /// Compute an `ObjectId` as the SHA-1 digest of `data`.
    pub fn digest(data: &[u8]) -> Self {
        Self(sha1_smol::Sha1::from(data).digest().bytes())
    }

    /// Create an `ObjectId` from a pre-computed digest.
    pub const fn from_hash(hash: [u8; RAW_LEN]) -> Self {
        Self(hash)
    }

    /// Create an `ObjectId` from a raw digest slice, which must be exactly 20 bytes.
    pub fn from_raw(raw: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; RAW_LEN] = raw.try_into().map_err(|_| TypeError::InvalidLength {
            expected: RAW_LEN,
            actual: raw.len(),
        })?;
        Ok(Self(arr))
    }

    /// The null object ID (all zeros).
    pub const fn null() -> Self {
        Self([0u8; RAW_LEN])
    }

    /// Returns `true` if this is the null object ID.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; RAW_LEN]
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; RAW_LEN] {
        &self.0
    }

    /// Hex-encoded string representation (40 lowercase characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Shard directory name: the first two hex characters.
    pub fn shard(&self) -> String {
        hex::encode(&self.0[..1])
    }

    /// File name inside the shard directory: the remaining 38 hex characters.
    pub fn shard_remainder(&self) -> String {
        hex::encode(&self.0[1..])
    }

    /// Parse from a 40-character lowercase hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != HEX_LEN {
            return Err(TypeError::InvalidLength {
                expected: HEX_LEN,
                actual: s.len(),
            });
        }
        if s.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(TypeError::InvalidHex(format!("not lowercase: {s}")));
        }
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_raw(&bytes)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; RAW_LEN]> for ObjectId {
    fn from(bytes: [u8; RAW_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectId> for [u8; RAW_LEN] {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
