//! Name-to-identifier resolution.
//!
//! Turning references such as `HEAD` or branch names into identifiers is
//! the caller's job. The store only needs something implementing
//! [`NameResolver`]; [`HexNameResolver`] covers full identifiers.

use odb_types::ObjectId;

use crate::error::{StoreError, StoreResult};

/// Resolves a human-facing name to an object identifier.
pub trait NameResolver {
    fn resolve(&self, name: &str) -> StoreResult<ObjectId>;
}

impl<F> NameResolver for F
where
    F: Fn(&str) -> StoreResult<ObjectId>,
{
    fn resolve(&self, name: &str) -> StoreResult<ObjectId> {
        self(name)
    }
}

/// Accepts only full 40-character hex identifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct HexNameResolver;

impl NameResolver for HexNameResolver {
    fn resolve(&self, name: &str) -> StoreResult<ObjectId> {
        name.trim().parse().map_err(|e: odb_types::TypeError| StoreError::InvalidName {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

    #[test]
    fn hex_resolver_accepts_full_ids() {
        let id = HexNameResolver.resolve(HELLO).unwrap();
        assert_eq!(id.to_hex(), HELLO);
    }

    #[test]
    fn hex_resolver_trims_whitespace() {
        let id = HexNameResolver.resolve(&format!("{HELLO}\n")).unwrap();
        assert_eq!(id.to_hex(), HELLO);
    }

    #[test]
    fn hex_resolver_rejects_refs_and_prefixes() {
        for name in [
            "HEAD",
            "ce0136",
            "refs/heads/main",
            "CE013625030BA8DBA906F756967F9E9CA394464A",
        ] {
            assert!(matches!(
                HexNameResolver.resolve(name),
                Err(StoreError::InvalidName { .. })
            ));
        }
    }

    #[test]
    fn closures_are_resolvers() {
        let head = ObjectId::digest(b"head");
        let resolver = move |name: &str| -> StoreResult<ObjectId> {
            match name {
                "HEAD" => Ok(head),
                other => HexNameResolver.resolve(other),
            }
        };
        assert_eq!(resolver.resolve("HEAD").unwrap(), head);
        assert_eq!(resolver.resolve(HELLO).unwrap().to_hex(), HELLO);
    }
}
