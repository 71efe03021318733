//! Object store configuration.
//!
//! Loaded from a `[store]` table in a TOML file:
//!
//! ```toml
//! [store]
//! root = ".git"
//! compression_level = 6
//! verify_on_read = true
//! fsync = false
//! read_only = false
//! ```
//!
//! Locating the repository is the caller's concern; the store only ever sees
//! the resolved `root`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Highest zlib compression level.
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Configuration for a [`LooseObjectStore`](crate::LooseObjectStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Object-store root. Objects live under `{root}/objects/`.
    pub root: PathBuf,
    /// zlib level, 0 (store) through 9 (best).
    pub compression_level: u32,
    /// Re-hash decompressed bytes and compare with the requested id.
    pub verify_on_read: bool,
    /// `fsync` the temporary file before renaming it into place.
    pub fsync: bool,
    /// Refuse persisting writes.
    pub read_only: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".git"),
            compression_level: 6,
            verify_on_read: true,
            fsync: false,
            read_only: false,
        }
    }
}

impl StoreConfig {
    /// Default configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Default configuration rooted at `root`, refusing writes.
    pub fn read_only(root: impl Into<PathBuf>) -> Self {
        Self {
            read_only: true,
            ..Self::with_root(root)
        }
    }

    /// Parse TOML text. A `[store]` table is used if present, otherwise the
    /// top-level table.
    pub fn from_toml_str(contents: &str) -> StoreResult<Self> {
        Self::parse(contents, None)
    }

    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| StoreError::Config {
            path: Some(path.to_path_buf()),
            reason: e.to_string(),
        })?;
        Self::parse(&contents, Some(path))
    }

    /// Check field ranges.
    pub fn validate(&self) -> StoreResult<()> {
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(StoreError::Config {
                path: None,
                reason: format!(
                    "compression_level must be at most {MAX_COMPRESSION_LEVEL}, got {}",
                    self.compression_level
                ),
            });
        }
        Ok(())
    }

    /// Directory holding the sharded object files.
    pub fn objects_dir(&self) -> PathBuf {
        self.root.join("objects")
    }

    fn parse(contents: &str, path: Option<&Path>) -> StoreResult<Self> {
        let err = |reason: String| StoreError::Config {
            path: path.map(Path::to_path_buf),
            reason,
        };

        let mut table: toml::Table = contents.parse().map_err(|e: toml::de::Error| err(e.to_string()))?;
        let section = match table.remove("store") {
            Some(toml::Value::Table(section)) => section,
            Some(_) => return Err(err("[store] must be a table".into())),
            None => table,
        };

        let config: Self = toml::Value::Table(section)
            .try_into()
            .map_err(|e: toml::de::Error| err(e.to_string()))?;
        config.validate().map_err(|e| match e {
            StoreError::Config { reason, .. } => err(reason),
            other => other,
        })?;
        Ok(config)
    }
}
