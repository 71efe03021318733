use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The kind of a stored object, as named by the type token in its frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Opaque file contents.
    Blob,
    /// Directory listing of packed entries.
    Tree,
    /// Key-value-list-with-message snapshot record.
    Commit,
    /// Annotated tag; same encoding as a commit.
    Tag,
}

impl ObjectKind {
    /// All kinds, in token order.
    pub const ALL: [ObjectKind; 4] = [Self::Blob, Self::Tree, Self::Commit, Self::Tag];

    /// The literal type token used in the frame header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
        }
    }

    /// Token bytes, as written into frames.
    pub fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    /// Parse a raw type token. Anything other than the four literals fails.
    pub fn from_token(token: &[u8]) -> Result<Self, TypeError> {
        match token {
            b"blob" => Ok(Self::Blob),
            b"tree" => Ok(Self::Tree),
            b"commit" => Ok(Self::Commit),
            b"tag" => Ok(Self::Tag),
            other => Err(TypeError::UnknownObjectType(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s.as_bytes())
    }
}
