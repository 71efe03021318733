use odb_codec::{decode_entries, encode_entries, frame, identify, unframe, CodecError, Kvlm, TreeEntry};
use odb_types::{ObjectId, ObjectKind};

use crate::error::{StoreError, StoreResult};

/// A decoded object of any kind.
///
/// The variant set is closed: decoding dispatches on the frame's type token
/// with a plain `match`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoredObject {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl StoredObject {
    /// The kind of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }

    /// Decode a payload of the given kind.
    pub fn deserialize(kind: ObjectKind, payload: &[u8]) -> StoreResult<Self> {
        Ok(match kind {
            ObjectKind::Blob => Self::Blob(Blob::new(payload.to_vec())),
            ObjectKind::Tree => Self::Tree(Tree::new(decode_entries(payload)?)),
            ObjectKind::Commit => Self::Commit(Commit::new(Kvlm::parse(payload)?)),
            ObjectKind::Tag => Self::Tag(Tag::new(Kvlm::parse(payload)?)),
        })
    }

    /// Encode the payload (no frame header).
    pub fn serialize(&self) -> StoreResult<Vec<u8>> {
        Ok(match self {
            Self::Blob(blob) => blob.data.clone(),
            Self::Tree(tree) => encode_entries(&tree.entries)?,
            Self::Commit(commit) => commit.kvlm.serialize(),
            Self::Tag(tag) => tag.kvlm.serialize(),
        })
    }

    /// Encode and attach the frame header.
    pub fn to_framed(&self) -> StoreResult<Vec<u8>> {
        Ok(frame(self.kind(), &self.serialize()?))
    }

    /// Strip the frame header and decode.
    pub fn from_framed(framed: &[u8]) -> StoreResult<Self> {
        let (kind, payload) = unframe(framed)?;
        Self::deserialize(kind, payload)
    }

    /// Compute the content-addressed ID without storing anything.
    pub fn compute_id(&self) -> StoreResult<ObjectId> {
        Ok(identify(&self.to_framed()?))
    }

    pub fn into_blob(self) -> StoreResult<Blob> {
        match self {
            Self::Blob(blob) => Ok(blob),
            other => Err(other.mismatch(ObjectKind::Blob)),
        }
    }

    pub fn into_tree(self) -> StoreResult<Tree> {
        match self {
            Self::Tree(tree) => Ok(tree),
            other => Err(other.mismatch(ObjectKind::Tree)),
        }
    }

    pub fn into_commit(self) -> StoreResult<Commit> {
        match self {
            Self::Commit(commit) => Ok(commit),
            other => Err(other.mismatch(ObjectKind::Commit)),
        }
    }

    pub fn into_tag(self) -> StoreResult<Tag> {
        match self {
            Self::Tag(tag) => Ok(tag),
            other => Err(other.mismatch(ObjectKind::Tag)),
        }
    }

    fn mismatch(&self, expected: ObjectKind) -> StoreError {
        StoreError::UnexpectedKind {
            expected,
            actual: self.kind(),
        }
    }
}

impl From<Blob> for StoredObject {
    fn from(blob: Blob) -> Self {
        Self::Blob(blob)
    }
}

impl From<Tree> for StoredObject {
    fn from(tree: Tree) -> Self {
        Self::Tree(tree)
    }
}

impl From<Commit> for StoredObject {
    fn from(commit: Commit) -> Self {
        Self::Commit(commit)
    }
}

impl From<Tag> for StoredObject {
    fn from(tag: Tag) -> Self {
        Self::Tag(tag)
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// Directory listing object.
///
/// Entries are kept in the order given or decoded; nothing sorts them
/// implicitly, so re-encoding reproduces the original bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a tree with entries in the given order.
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up an entry by path.
    pub fn get(&self, path: &[u8]) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reorder entries into canonical tree order, where a directory sorts as
    /// if its name ended in `/`.
    pub fn sort_canonical(&mut self) {
        self.entries.sort_by(TreeEntry::canonical_cmp);
    }

    /// Whether the entries are already in canonical order.
    pub fn is_canonical(&self) -> bool {
        self.entries
            .windows(2)
            .all(|w| w[0].canonical_cmp(&w[1]).is_le())
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Snapshot record: `tree`, `parent`*, `author`, `committer` fields and a message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commit {
    pub kvlm: Kvlm,
}

impl Commit {
    pub fn new(kvlm: Kvlm) -> Self {
        Self { kvlm }
    }

    /// Build a commit with the conventional field order.
    pub fn from_parts(
        tree: ObjectId,
        parents: &[ObjectId],
        author: &[u8],
        committer: &[u8],
        message: &[u8],
    ) -> StoreResult<Self> {
        let mut kvlm = Kvlm::new();
        kvlm.push("tree", tree.to_hex())?;
        for parent in parents {
            kvlm.push("parent", parent.to_hex())?;
        }
        kvlm.push("author", author)?;
        kvlm.push("committer", committer)?;
        kvlm.set_message(message);
        Ok(Self { kvlm })
    }

    /// The root tree this commit records.
    pub fn tree(&self) -> StoreResult<Option<ObjectId>> {
        self.kvlm
            .get_first(b"tree")
            .map(|v| parse_id_field(b"tree", v))
            .transpose()
    }

    /// Parent commits in document order; empty for a root commit.
    pub fn parents(&self) -> StoreResult<Vec<ObjectId>> {
        self.kvlm
            .get_all(b"parent")
            .iter()
            .map(|v| parse_id_field(b"parent", v))
            .collect()
    }

    pub fn author(&self) -> Option<&[u8]> {
        self.kvlm.get_first(b"author")
    }

    pub fn committer(&self) -> Option<&[u8]> {
        self.kvlm.get_first(b"committer")
    }

    pub fn message(&self) -> &[u8] {
        self.kvlm.message()
    }
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// Annotated tag: `object`, `type`, `tag`, `tagger` fields and a message.
///
/// Encoded exactly like a commit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tag {
    pub kvlm: Kvlm,
}

impl Tag {
    pub fn new(kvlm: Kvlm) -> Self {
        Self { kvlm }
    }

    /// Build a tag with the conventional field order.
    pub fn from_parts(
        object: ObjectId,
        kind: ObjectKind,
        name: &[u8],
        tagger: &[u8],
        message: &[u8],
    ) -> StoreResult<Self> {
        let mut kvlm = Kvlm::new();
        kvlm.push("object", object.to_hex())?;
        kvlm.push("type", kind.as_str())?;
        kvlm.push("tag", name)?;
        kvlm.push("tagger", tagger)?;
        kvlm.set_message(message);
        Ok(Self { kvlm })
    }

    /// The tagged object.
    pub fn object(&self) -> StoreResult<Option<ObjectId>> {
        self.kvlm
            .get_first(b"object")
            .map(|v| parse_id_field(b"object", v))
            .transpose()
    }

    /// The kind recorded for the tagged object.
    pub fn target_kind(&self) -> StoreResult<Option<ObjectKind>> {
        self.kvlm
            .get_first(b"type")
            .map(|v| ObjectKind::from_token(v).map_err(|e| StoreError::Codec(e.into())))
            .transpose()
    }

    pub fn name(&self) -> Option<&[u8]> {
        self.kvlm.get_first(b"tag")
    }

    pub fn tagger(&self) -> Option<&[u8]> {
        self.kvlm.get_first(b"tagger")
    }

    pub fn message(&self) -> &[u8] {
        self.kvlm.message()
    }
}

fn parse_id_field(key: &[u8], value: &[u8]) -> StoreResult<ObjectId> {
    std::str::from_utf8(value)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            StoreError::Codec(CodecError::MalformedKvlm {
                offset: 0,
                reason: format!(
                    "{} is not an object id: {:?}",
                    String::from_utf8_lossy(key),
                    String::from_utf8_lossy(value)
                ),
            })
        })
}
