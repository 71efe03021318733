//! Foundation types for the object database.
//!
//! Every other `odb` crate depends on `odb-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content address of a framed object (SHA-1, rendered as 40 lowercase hex characters)
//! - [`ObjectKind`] -- The four object type tokens: `blob`, `tree`, `commit`, `tag`

pub mod error;
pub mod kind;
pub mod object;

pub use error::TypeError;
pub use kind::ObjectKind;
pub use object::ObjectId;
