use std::collections::HashMap;
use std::sync::RwLock;

use odb_codec::{identify, unframe};
use odb_types::ObjectId;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Framed bytes are held uncompressed
/// behind a `RwLock` for safe concurrent access.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read_raw(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let map = self.objects.read().expect("lock poisoned");
        map.get(id).cloned().ok_or(StoreError::NotFound(*id))
    }

    fn write_raw(&self, framed: &[u8], persist: bool) -> StoreResult<ObjectId> {
        unframe(framed)?;
        let id = identify(framed);
        if !persist {
            debug!(id = %id, "dry run, object not written");
            return Ok(id);
        }
        let mut map = self.objects.write().expect("lock poisoned");
        // Same ID always maps to the same bytes.
        map.entry(id).or_insert_with(|| framed.to_vec());
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::*;
    use crate::resolve::HexNameResolver;
    use odb_codec::{frame, EntryMode, TreeEntry};
    use odb_types::ObjectKind;

    fn make_blob(content: &[u8]) -> StoredObject {
        Blob::new(content.to_vec()).into()
    }

    fn make_tree() -> StoredObject {
        Tree::new(vec![
            TreeEntry::with_mode(EntryMode::Regular, "hello.txt", ObjectId::digest(b"hello")),
            TreeEntry::with_mode(EntryMode::Directory, "subdir", ObjectId::digest(b"subdir")),
        ])
        .into()
    }

    fn make_commit(tree: ObjectId) -> StoredObject {
        Commit::from_parts(
            tree,
            &[],
            b"A U Thor <a@example.com> 0 +0000",
            b"A U Thor <a@example.com> 0 +0000",
            b"initial\n",
        )
        .unwrap()
        .into()
    }

    // -----------------------------------------------------------------------
    // Core read/write
    // -----------------------------------------------------------------------

    #[test]
    fn write_and_read_blob() {
        let store = InMemoryObjectStore::new();
        let obj = make_blob(b"hello\n");
        let id = store.encode(&obj, true).unwrap();
        assert_eq!(id.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");

        assert_eq!(store.read_raw(&id).unwrap(), b"blob 6\0hello\n");
        assert_eq!(store.decode(&id).unwrap(), obj);
    }

    #[test]
    fn write_and_read_tree() {
        let store = InMemoryObjectStore::new();
        let id = store.encode(&make_tree(), true).unwrap();

        let tree = store.decode(&id).unwrap().into_tree().unwrap();
        assert_eq!(tree.len(), 2);
        assert!(tree.get(b"hello.txt").is_some());
        assert!(tree.get(b"subdir").unwrap().is_directory());
    }

    #[test]
    fn write_and_read_commit() {
        let store = InMemoryObjectStore::new();
        let tree_id = store.encode(&make_tree(), true).unwrap();
        let id = store.encode(&make_commit(tree_id), true).unwrap();

        let commit = store.decode(&id).unwrap().into_commit().unwrap();
        assert_eq!(commit.tree().unwrap(), Some(tree_id));
        assert!(commit.parents().unwrap().is_empty());
        assert_eq!(commit.message(), b"initial\n");
    }

    #[test]
    fn read_missing_object_is_not_found() {
        let store = InMemoryObjectStore::new();
        let id = ObjectId::digest(b"missing");
        assert!(matches!(store.read_raw(&id), Err(StoreError::NotFound(_))));
        assert!(matches!(store.decode(&id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn malformed_frames_are_rejected() {
        let store = InMemoryObjectStore::new();
        assert!(matches!(
            store.write_raw(b"blob 3\0toolong", true),
            Err(StoreError::Codec(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn write_payload_validates_before_framing() {
        let store = InMemoryObjectStore::new();
        let id = store.write_payload(ObjectKind::Blob, b"hello\n", true).unwrap();
        assert_eq!(id.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");

        let err = store.write_payload(ObjectKind::Tree, b"not a tree", true).unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));
        assert_eq!(store.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Dry run
    // -----------------------------------------------------------------------

    #[test]
    fn dry_run_computes_id_without_storing() {
        let store = InMemoryObjectStore::new();
        let obj = make_blob(b"hello\n");
        let dry = store.encode(&obj, false).unwrap();
        assert!(store.is_empty());
        assert!(!store.exists(&dry).unwrap());

        let real = store.encode(&obj, true).unwrap();
        assert_eq!(dry, real);
        assert!(store.exists(&real).unwrap());
    }

    // -----------------------------------------------------------------------
    // Content-addressing correctness
    // -----------------------------------------------------------------------

    #[test]
    fn same_content_produces_same_id() {
        let store = InMemoryObjectStore::new();
        let id1 = store.encode(&make_blob(b"identical content"), true).unwrap();
        let id2 = store.encode(&make_blob(b"identical content"), true).unwrap();
        assert_eq!(id1, id2);
        // Only one object stored (dedup)
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn different_content_produces_different_ids() {
        let store = InMemoryObjectStore::new();
        let id1 = store.encode(&make_blob(b"aaa"), true).unwrap();
        let id2 = store.encode(&make_blob(b"bbb"), true).unwrap();
        assert_ne!(id1, id2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn same_payload_different_kind_differs() {
        let store = InMemoryObjectStore::new();
        let blob = store.write_raw(&frame(ObjectKind::Blob, b""), true).unwrap();
        let tree = store.write_raw(&frame(ObjectKind::Tree, b""), true).unwrap();
        assert_ne!(blob, tree);
        assert_eq!(tree.to_hex(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    }

    // -----------------------------------------------------------------------
    // Name resolution
    // -----------------------------------------------------------------------

    #[test]
    fn decode_named_with_hex_resolver() {
        let store = InMemoryObjectStore::new();
        let obj = make_blob(b"named");
        let id = store.encode(&obj, true).unwrap();

        let (resolved, decoded) = store.decode_named(&HexNameResolver, &id.to_hex()).unwrap();
        assert_eq!(resolved, id);
        assert_eq!(decoded, obj);
    }

    #[test]
    fn decode_named_with_closure() {
        let store = InMemoryObjectStore::new();
        let tree_id = store.encode(&make_tree(), true).unwrap();
        let head = store.encode(&make_commit(tree_id), true).unwrap();

        let refs = move |name: &str| -> StoreResult<ObjectId> {
            match name {
                "HEAD" => Ok(head),
                other => Err(StoreError::InvalidName {
                    name: other.to_string(),
                    reason: "unknown ref".into(),
                }),
            }
        };
        let (id, obj) = store.decode_named(&refs, "HEAD").unwrap();
        assert_eq!(id, head);
        assert_eq!(obj.kind(), ObjectKind::Commit);
        assert!(matches!(
            store.decode_named(&refs, "main"),
            Err(StoreError::InvalidName { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[test]
    fn len_and_is_empty() {
        let store = InMemoryObjectStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);

        store.encode(&make_blob(b"a"), true).unwrap();
        assert!(!store.is_empty());
        assert_eq!(store.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Concurrent read safety
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryObjectStore::new());
        let id = store.encode(&make_blob(b"shared data"), true).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let framed = store.read_raw(&id).unwrap();
                    assert_eq!(identify(&framed), id);
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
    }

    // -----------------------------------------------------------------------
    // Default / Debug
    // -----------------------------------------------------------------------

    #[test]
    fn default_creates_empty_store() {
        let store = InMemoryObjectStore::default();
        assert!(store.is_empty());
    }

    #[test]
    fn debug_format() {
        let store = InMemoryObjectStore::new();
        store.encode(&make_blob(b"x"), true).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryObjectStore"));
        assert!(debug.contains("object_count"));
    }
}
