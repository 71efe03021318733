//! Byte codecs for the object database.
//!
//! Three independent formats, all of which must round-trip byte-for-byte so
//! that object identifiers stay stable:
//!
//! - [`frame`] -- the `<kind> <len>\0<payload>` envelope and its SHA-1 identity
//! - [`tree`] -- packed `<mode> <path>\0<20 raw bytes>` directory records
//! - [`kvlm`] -- ordered `key value` lines followed by a free-text message,
//!   shared by commits and tags
//!
//! Nothing in this crate touches the filesystem.

pub mod error;
pub mod frame;
pub mod kvlm;
pub mod tree;

pub use error::{CodecError, CodecResult};
pub use frame::{frame, identify, unframe};
pub use kvlm::{Kvlm, KvlmValue};
pub use tree::{decode_entries, encode_entries, EntryMode, TreeEntry};
