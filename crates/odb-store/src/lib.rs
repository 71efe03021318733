//! Content-addressed object storage.
//!
//! This crate implements the object model and the loose object directory of
//! a git-compatible repository. Every object is framed as
//! `<kind> <len>\0<payload>`, identified by the SHA-1 of those framed bytes,
//! and stored zlib-compressed under `{root}/objects/<2 hex>/<38 hex>`.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content
//! - [`Tree`] -- ordered directory listing of `(mode, path, target)` entries
//! - [`Commit`] -- key-value headers plus message
//! - [`Tag`] -- annotated tag, same layout as a commit
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- one compressed file per object on disk
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written; rewriting an existing ID is a no-op.
//! 2. A write either lands completely (temp file + rename) or not at all.
//! 3. A dry-run write (`persist = false`) returns the ID and touches nothing.
//! 4. Reads never create directories.
//! 5. Name resolution is delegated to a caller-supplied [`NameResolver`].

pub mod config;
pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod resolve;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use loose::{resolve_path, LooseObjectStore};
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, StoredObject, Tag, Tree};
pub use odb_codec::{EntryMode, Kvlm, KvlmValue, TreeEntry};
pub use odb_types::{ObjectId, ObjectKind};
pub use resolve::{HexNameResolver, NameResolver};
pub use traits::ObjectStore;
