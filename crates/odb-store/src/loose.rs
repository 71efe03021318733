//! Filesystem object store: one zlib-compressed framed object per file.
//!
//! Layout:
//! ```text
//! {root}/
//! └── objects/
//!     ├── ce/
//!     │   └── 013625030ba8dba906f756967f9e9ca394464a
//!     └── 4b/
//!         └── 825dc642cb6eb9a060e54bf8d69288fbee4904
//! ```
//!
//! Writes go to a temporary file in the shard directory and are renamed into
//! place, so a reader either sees a complete object or none at all. A write
//! that fails before the rename leaves nothing behind.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use odb_codec::{identify, unframe};
use odb_types::{ObjectId, ObjectKind};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// Sharded path of `id` under an object-store root:
/// `{root}/objects/{id[0..2]}/{id[2..]}`.
pub fn resolve_path(root: &Path, id: &ObjectId) -> PathBuf {
    root.join("objects")
        .join(id.shard())
        .join(id.shard_remainder())
}

/// Loose object directory on the local filesystem.
#[derive(Clone, Debug)]
pub struct LooseObjectStore {
    config: StoreConfig,
}

impl LooseObjectStore {
    /// Open a store with the given configuration.
    ///
    /// Nothing is created on disk until the first persisting write.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Open a store rooted at `root` with default settings.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::new(StoreConfig::with_root(root))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Where the object `id` lives (whether or not it exists).
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        resolve_path(&self.config.root, id)
    }

    fn compress(&self, framed: &[u8], out: impl Write) -> io::Result<()> {
        let mut encoder = ZlibEncoder::new(out, Compression::new(self.config.compression_level));
        encoder.write_all(framed)?;
        encoder.finish()?;
        Ok(())
    }

    fn store_compressed(&self, id: &ObjectId, kind: ObjectKind, framed: &[u8]) -> StoreResult<()> {
        let path = self.object_path(id);
        if path.exists() {
            debug!(id = %id, %kind, "object already present");
            return Ok(());
        }

        let shard = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "object path has no parent"))?;
        fs::create_dir_all(shard)?;

        // Dropping the temp file on any error below removes it.
        let mut tmp = NamedTempFile::new_in(shard)?;
        self.compress(framed, tmp.as_file_mut())?;
        if self.config.fsync {
            tmp.as_file().sync_all()?;
        }
        let compressed = tmp.as_file().metadata()?.len();
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(id = %id, %kind, len = framed.len(), compressed, "object written");
        Ok(())
    }
}

impl ObjectStore for LooseObjectStore {
    fn read_raw(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let path = self.object_path(id);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*id));
            }
            Err(e) => return Err(e.into()),
        };

        let mut framed = Vec::new();
        if let Err(e) = ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut framed) {
            warn!(id = %id, error = %e, "failed to decompress object");
            return Err(StoreError::CorruptObject {
                id: *id,
                reason: format!("decompression failed: {e}"),
            });
        }

        if self.config.verify_on_read {
            let computed = identify(&framed);
            if computed != *id {
                warn!(id = %id, computed = %computed, "object hash mismatch");
                return Err(StoreError::HashMismatch {
                    expected: *id,
                    computed,
                });
            }
        }

        debug!(id = %id, len = framed.len(), "object read");
        Ok(framed)
    }

    fn write_raw(&self, framed: &[u8], persist: bool) -> StoreResult<ObjectId> {
        // Refuse to store bytes that could never be read back.
        let (kind, _) = unframe(framed)?;
        let id = identify(framed);

        if !persist {
            debug!(id = %id, "dry run, object not written");
            return Ok(id);
        }
        if self.config.read_only {
            return Err(StoreError::ReadOnly);
        }

        self.store_compressed(&id, kind, framed)?;
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }
}
