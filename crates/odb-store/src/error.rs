use std::path::PathBuf;

use odb_codec::CodecError;
use odb_types::{ObjectId, ObjectKind};

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No object file exists at the resolved path.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The stored bytes could not be decompressed, or are truncated/garbled.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// Decompressed bytes do not hash to the identifier they were stored under.
    #[error("hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch {
        expected: ObjectId,
        computed: ObjectId,
    },

    /// Framing, tree, or kvlm bytes failed to decode or encode.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A typed accessor was asked for the wrong kind of object.
    #[error("expected {expected} object, got {actual}")]
    UnexpectedKind {
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// A name could not be resolved to an object identifier.
    #[error("cannot resolve object name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// Store configuration could not be loaded or is invalid.
    #[error("invalid store configuration {path:?}: {reason}")]
    Config {
        path: Option<PathBuf>,
        reason: String,
    },

    /// Store is read-only.
    #[error("store is read-only")]
    ReadOnly,

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether re-issuing the same read may succeed.
    ///
    /// Only a missing object qualifies: another process may be renaming it
    /// into place right now. Every other failure is final for the operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
