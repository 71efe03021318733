//! Packed tree entries: `<mode digits> <path>\0<20 raw hash bytes>`, repeated
//! with no separators.
//!
//! The codec preserves entry order in both directions. Canonical ordering is
//! the caller's business (see [`TreeEntry::canonical_cmp`]).

use std::cmp::Ordering;
use std::fmt;

use odb_types::object::RAW_LEN;
use odb_types::{ObjectId, ObjectKind};
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};

/// Well-known file modes for a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    /// Normal file (`100644`).
    Regular,
    /// Executable file (`100755`).
    Executable,
    /// Symbolic link (`120000`).
    Symlink,
    /// Subtree / directory (`40000`).
    Directory,
    /// Submodule commit reference (`160000`).
    Gitlink,
}

impl EntryMode {
    /// The mode digits as written into tree payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "100644",
            Self::Executable => "100755",
            Self::Symlink => "120000",
            Self::Directory => "40000",
            Self::Gitlink => "160000",
        }
    }

    /// Parse from mode digits. The zero-padded `040000` form is accepted.
    pub fn from_mode_str(mode: &str) -> Option<Self> {
        match mode {
            "100644" => Some(Self::Regular),
            "100755" => Some(Self::Executable),
            "120000" => Some(Self::Symlink),
            "40000" | "040000" => Some(Self::Directory),
            "160000" => Some(Self::Gitlink),
            _ => None,
        }
    }

    /// The kind of object an entry with this mode points at.
    pub fn implied_kind(&self) -> ObjectKind {
        match self {
            Self::Directory => ObjectKind::Tree,
            Self::Gitlink => ObjectKind::Commit,
            Self::Regular | Self::Executable | Self::Symlink => ObjectKind::Blob,
        }
    }
}

impl fmt::Display for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single record in a tree payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Mode digits exactly as stored (5 or 6 ASCII digits).
    pub mode: String,
    /// Entry name bytes.
    pub path: Vec<u8>,
    /// The blob or tree this entry refers to.
    pub target: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry from raw mode digits.
    pub fn new(mode: impl Into<String>, path: impl Into<Vec<u8>>, target: ObjectId) -> Self {
        Self {
            mode: mode.into(),
            path: path.into(),
            target,
        }
    }

    /// Create a new tree entry from a well-known mode.
    pub fn with_mode(mode: EntryMode, path: impl Into<Vec<u8>>, target: ObjectId) -> Self {
        Self::new(mode.as_str(), path, target)
    }

    /// The well-known mode, if the digits match one.
    pub fn entry_mode(&self) -> Option<EntryMode> {
        EntryMode::from_mode_str(&self.mode)
    }

    /// Returns `true` if this entry names a subtree.
    pub fn is_directory(&self) -> bool {
        self.entry_mode() == Some(EntryMode::Directory)
    }

    /// Mode zero-padded to six digits, for listings.
    pub fn padded_mode(&self) -> String {
        format!("{:0>6}", self.mode)
    }

    /// Path as text, replacing invalid UTF-8.
    pub fn path_lossy(&self) -> String {
        String::from_utf8_lossy(&self.path).into_owned()
    }

    /// Canonical tree order: path bytes, with directories compared as if
    /// their path ended in `/`.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        let a = self.path.iter().chain(self.is_directory().then_some(&b'/'));
        let b = other.path.iter().chain(other.is_directory().then_some(&b'/'));
        a.cmp(b)
    }
}

/// Decode a whole tree payload into its records, in stored order.
pub fn decode_entries(payload: &[u8]) -> CodecResult<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    let mut pos = 0;
    while pos < payload.len() {
        let (entry, next) = decode_one(payload, pos)?;
        entries.push(entry);
        pos = next;
    }
    Ok(entries)
}

/// Decode the record starting at `start`; returns it with the offset of the
/// next record.
fn decode_one(payload: &[u8], start: usize) -> CodecResult<(TreeEntry, usize)> {
    let space = find(payload, b' ', start)
        .ok_or_else(|| malformed(start, "missing mode terminator"))?;
    let mode = validate_mode(&payload[start..space]).map_err(|reason| malformed(start, reason))?;

    let nul = find(payload, 0, space + 1)
        .ok_or_else(|| malformed(start, "missing path terminator"))?;
    let path = payload[space + 1..nul].to_vec();

    let hash_start = nul + 1;
    let hash_end = hash_start + RAW_LEN;
    if hash_end > payload.len() {
        return Err(malformed(
            start,
            format!(
                "truncated hash: expected {RAW_LEN} bytes, found {}",
                payload.len() - hash_start
            ),
        ));
    }
    let target = ObjectId::from_raw(&payload[hash_start..hash_end])
        .map_err(|e| malformed(start, e.to_string()))?;

    Ok((TreeEntry { mode, path, target }, hash_end))
}

/// Encode records in the given order.
pub fn encode_entries(entries: &[TreeEntry]) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    for entry in entries {
        let offset = out.len();
        validate_mode(entry.mode.as_bytes()).map_err(|reason| malformed(offset, reason))?;
        if entry.path.is_empty() {
            return Err(malformed(offset, "empty path"));
        }
        if entry.path.contains(&0) {
            return Err(malformed(offset, "path contains NUL"));
        }
        if entry.path.contains(&b'/') {
            return Err(malformed(offset, "path contains '/'"));
        }
        out.extend_from_slice(entry.mode.as_bytes());
        out.push(b' ');
        out.extend_from_slice(&entry.path);
        out.push(0);
        out.extend_from_slice(entry.target.as_bytes());
    }
    Ok(out)
}

fn validate_mode(mode: &[u8]) -> Result<String, String> {
    if mode.len() != 5 && mode.len() != 6 {
        return Err(format!("mode must be 5 or 6 digits, got {}", mode.len()));
    }
    if !mode.iter().all(u8::is_ascii_digit) {
        return Err(format!(
            "mode is not numeric: {:?}",
            String::from_utf8_lossy(mode)
        ));
    }
    // ASCII digits are valid UTF-8.
    Ok(String::from_utf8_lossy(mode).into_owned())
}

fn find(haystack: &[u8], needle: u8, from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| from + i)
}

fn malformed(offset: usize, reason: impl Into<String>) -> CodecError {
    CodecError::MalformedTreeEntry {
        offset,
        reason: reason.into(),
    }
}
