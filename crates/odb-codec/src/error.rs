use odb_types::TypeError;

/// Errors from decoding or encoding object bytes.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// The frame's type token is not one of `blob`, `tree`, `commit`, `tag`.
    #[error("unknown object type: {0}")]
    UnknownObjectType(String),

    /// The frame header is missing a terminator or its length field is wrong.
    #[error("malformed object: {reason}")]
    MalformedObject { reason: String },

    /// A tree record has a bad mode, a missing NUL, or a truncated hash.
    #[error("malformed tree entry at offset {offset}: {reason}")]
    MalformedTreeEntry { offset: usize, reason: String },

    /// A commit/tag document is not valid key-value-list-with-message text.
    #[error("malformed kvlm at offset {offset}: {reason}")]
    MalformedKvlm { offset: usize, reason: String },
}

impl From<TypeError> for CodecError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UnknownObjectType(token) => Self::UnknownObjectType(token),
            other => Self::MalformedObject {
                reason: other.to_string(),
            },
        }
    }
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
