use odb_codec::frame;
use odb_types::{ObjectId, ObjectKind};

use crate::error::StoreResult;
use crate::object::StoredObject;
use crate::resolve::NameResolver;

/// Content-addressed object store.
///
/// Backends deal only in framed bytes (`<kind> <len>\0<payload>`); the
/// provided methods layer the object model on top.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same framed bytes always
///   produce the same ID, so rewriting an ID is a no-op.
/// - A reader never observes a partially written object.
/// - The returned ID is computed whether or not the write is persisted.
pub trait ObjectStore: Send + Sync {
    /// Read the framed bytes stored under `id`.
    ///
    /// Fails with [`StoreError::NotFound`](crate::StoreError::NotFound) if
    /// no object exists.
    fn read_raw(&self, id: &ObjectId) -> StoreResult<Vec<u8>>;

    /// Identify framed bytes and, if `persist` is set, store them.
    fn write_raw(&self, framed: &[u8], persist: bool) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Read and decode the object stored under `id`.
    fn decode(&self, id: &ObjectId) -> StoreResult<StoredObject> {
        StoredObject::from_framed(&self.read_raw(id)?)
    }

    /// Encode `object`, returning its ID; stores it only if `persist` is set.
    fn encode(&self, object: &StoredObject, persist: bool) -> StoreResult<ObjectId> {
        self.write_raw(&object.to_framed()?, persist)
    }

    /// Frame an arbitrary payload as `kind` after checking that it decodes,
    /// then write it.
    fn write_payload(&self, kind: ObjectKind, payload: &[u8], persist: bool) -> StoreResult<ObjectId> {
        StoredObject::deserialize(kind, payload)?;
        self.write_raw(&frame(kind, payload), persist)
    }

    /// Resolve a human name through `resolver`, then decode the object.
    fn decode_named(&self, resolver: &dyn NameResolver, name: &str) -> StoreResult<(ObjectId, StoredObject)> {
        let id = resolver.resolve(name)?;
        let object = self.decode(&id)?;
        Ok((id, object))
    }
}
