//! Key-value-list-with-message documents, the text format shared by commit
//! and tag payloads.
//!
//! ```text
//! tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904
//! parent 1111111111111111111111111111111111111111
//! parent 2222222222222222222222222222222222222222
//! author A U Thor <a@example.com> 1700000000 +0000
//! gpgsig -----BEGIN PGP SIGNATURE-----
//!  <continuation lines start with one space>
//!
//! Free-text message, everything after the first blank line.
//! ```
//!
//! A newline inside a value is written as newline + space; the space is
//! dropped again on parse. Repeated keys accumulate their values in document
//! order.

use crate::error::{CodecError, CodecResult};

/// A field value: one value, or several once a key has been repeated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KvlmValue {
    Single(Vec<u8>),
    List(Vec<Vec<u8>>),
}

impl KvlmValue {
    /// All values in document order.
    pub fn values(&self) -> &[Vec<u8>] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::List(values) => values,
        }
    }

    /// The first value.
    pub fn first(&self) -> Option<&[u8]> {
        self.values().first().map(Vec::as_slice)
    }

    /// Append a value, promoting a single value to a list.
    pub fn push(&mut self, value: Vec<u8>) {
        match self {
            Self::Single(existing) => {
                let first = std::mem::take(existing);
                *self = Self::List(vec![first, value]);
            }
            Self::List(values) => values.push(value),
        }
    }
}

/// An ordered set of keyed fields plus a trailing message.
///
/// Keys keep their first-insertion order. The message has no key of its own;
/// on the wire it is everything after the first blank line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Kvlm {
    fields: Vec<(Vec<u8>, KvlmValue)>,
    message: Vec<u8>,
}

impl Kvlm {
    /// An empty document with an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a field.
    pub fn get(&self, key: &[u8]) -> Option<&KvlmValue> {
        self.fields
            .iter()
            .find(|(k, _)| k.as_slice() == key)
            .map(|(_, v)| v)
    }

    /// The first value stored under `key`.
    pub fn get_first(&self, key: &[u8]) -> Option<&[u8]> {
        self.get(key).and_then(KvlmValue::first)
    }

    /// Every value stored under `key`, empty if the key is absent.
    pub fn get_all(&self, key: &[u8]) -> &[Vec<u8>] {
        self.get(key).map(KvlmValue::values).unwrap_or(&[])
    }

    /// Append a value under `key`, keeping any existing values.
    pub fn push(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> CodecResult<()> {
        let key = key.into();
        check_key(&key)?;
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.push(value),
            None => self.fields.push((key, KvlmValue::Single(value))),
        }
        Ok(())
    }

    /// Replace whatever is stored under `key` with a single value. A new key
    /// goes to the end; an existing key keeps its position.
    pub fn set(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> CodecResult<()> {
        let key = key.into();
        check_key(&key)?;
        let value = KvlmValue::Single(value.into());
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
        Ok(())
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, key: &[u8]) -> Option<KvlmValue> {
        let idx = self.fields.iter().position(|(k, _)| k.as_slice() == key)?;
        Some(self.fields.remove(idx).1)
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&[u8], &KvlmValue)> {
        self.fields.iter().map(|(k, v)| (k.as_slice(), v))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.fields.iter().map(|(k, _)| k.as_slice())
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<Vec<u8>>) {
        self.message = message.into();
    }

    /// Parse a raw document.
    ///
    /// Scans line by line from the start: a line whose first space comes
    /// before its newline is a field; the first line with no such space must
    /// be empty, and everything after it is the message.
    pub fn parse(raw: &[u8]) -> CodecResult<Self> {
        let mut doc = Self::new();
        let mut start = 0;

        loop {
            let space = find(raw, b' ', start);
            let newline = find(raw, b'\n', start);

            let space = match (space, newline) {
                (Some(s), Some(n)) if s < n => s,
                (Some(s), None) => s,
                _ => {
                    if newline != Some(start) {
                        return Err(malformed(start, "expected blank line before message"));
                    }
                    doc.message = raw[start + 1..].to_vec();
                    return Ok(doc);
                }
            };

            let key = &raw[start..space];
            if key.is_empty() {
                return Err(malformed(start, "continuation line without a key"));
            }

            // A newline followed by a space is a wrapped value, not the end.
            let mut end = newline.ok_or_else(|| malformed(start, "unterminated value"))?;
            while raw.get(end + 1) == Some(&b' ') {
                end = find(raw, b'\n', end + 1)
                    .ok_or_else(|| malformed(start, "unterminated value"))?;
            }

            let value = unwrap_continuations(&raw[space + 1..end]);
            let key = key.to_vec();
            match doc.fields.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => existing.push(value),
                None => doc.fields.push((key, KvlmValue::Single(value))),
            }

            start = end + 1;
        }
    }

    /// Serialize back to raw bytes. `parse(serialize(d)) == d` for any
    /// document built through this API.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, value) in &self.fields {
            for v in value.values() {
                out.extend_from_slice(key);
                out.push(b' ');
                wrap_continuations(v, &mut out);
                out.push(b'\n');
            }
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }
}

fn check_key(key: &[u8]) -> CodecResult<()> {
    if key.is_empty() {
        return Err(malformed(0, "empty key"));
    }
    if key.iter().any(|&b| b == b' ' || b == b'\n') {
        return Err(malformed(
            0,
            format!(
                "key contains space or newline: {:?}",
                String::from_utf8_lossy(key)
            ),
        ));
    }
    Ok(())
}

/// Collapse every `\n ` pair to `\n`.
fn unwrap_continuations(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        out.push(raw[i]);
        if raw[i] == b'\n' && raw.get(i + 1) == Some(&b' ') {
            i += 2;
        } else {
            i += 1;
        }
    }
    out
}

/// Expand every `\n` to `\n `.
fn wrap_continuations(value: &[u8], out: &mut Vec<u8>) {
    for &b in value {
        out.push(b);
        if b == b'\n' {
            out.push(b' ');
        }
    }
}

fn find(haystack: &[u8], needle: u8, from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| from + i)
}

fn malformed(offset: usize, reason: impl Into<String>) -> CodecError {
    CodecError::MalformedKvlm {
        offset,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const COMMIT: &[u8] = b"tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147\n\
parent 206941306e8a8af65b66eaaaea388a7ae24d49a0\n\
parent 3a8b6a5e2b4f6b5d7c4bb3c8c9f2e1d0a9b8c7d6\n\
author Thibault Polge <thibault@thb.lt> 1527025023 +0200\n\
committer Thibault Polge <thibault@thb.lt> 1527025044 +0200\n\
gpgsig -----BEGIN PGP SIGNATURE-----\n \n iQIzBAABCAAdFiEExwXquOM8bWb4Q2zVGxM2FxoLkGQFAlsEjZQACgkQGxM2FxoL\n -----END PGP SIGNATURE-----\n\
\n\
Initial commit\n";

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parse_commit_fields() {
        let doc = Kvlm::parse(COMMIT).unwrap();
        assert_eq!(
            doc.get_first(b"tree").unwrap(),
            b"29ff16c9c14e2652b22f8b78bb08a5a07930c147"
        );
        let parents = doc.get_all(b"parent");
        assert_eq!(parents.len(), 2);
        assert_eq!(parents[0], b"206941306e8a8af65b66eaaaea388a7ae24d49a0");
        assert_eq!(parents[1], b"3a8b6a5e2b4f6b5d7c4bb3c8c9f2e1d0a9b8c7d6");
        assert!(matches!(doc.get(b"parent"), Some(KvlmValue::List(_))));
        assert!(matches!(doc.get(b"author"), Some(KvlmValue::Single(_))));
        assert_eq!(doc.message(), b"Initial commit\n");
    }

    #[test]
    fn parse_keeps_key_order() {
        let doc = Kvlm::parse(COMMIT).unwrap();
        let keys: Vec<&[u8]> = doc.keys().collect();
        let expected: &[&[u8]] = &[b"tree", b"parent", b"author", b"committer", b"gpgsig"];
        assert_eq!(keys, expected);
    }

    #[test]
    fn parse_unwraps_continuation_lines() {
        let doc = Kvlm::parse(COMMIT).unwrap();
        let sig = doc.get_first(b"gpgsig").unwrap();
        assert_eq!(
            sig,
            &b"-----BEGIN PGP SIGNATURE-----\n\niQIzBAABCAAdFiEExwXquOM8bWb4Q2zVGxM2FxoLkGQFAlsEjZQACgkQGxM2FxoL\n-----END PGP SIGNATURE-----"[..]
        );
    }

    #[test]
    fn serialize_reproduces_parsed_commit() {
        let doc = Kvlm::parse(COMMIT).unwrap();
        assert_eq!(doc.serialize(), COMMIT);
    }

    #[test]
    fn message_may_contain_field_like_lines() {
        let raw = b"tag v1\n\nsubject\n\nkey value\n";
        let doc = Kvlm::parse(raw).unwrap();
        assert_eq!(doc.message(), b"subject\n\nkey value\n");
        assert_eq!(doc.keys().count(), 1);
    }

    #[test]
    fn parse_no_fields() {
        let doc = Kvlm::parse(b"\nonly a message").unwrap();
        assert_eq!(doc.keys().count(), 0);
        assert_eq!(doc.message(), b"only a message");
    }

    #[test]
    fn parse_empty_message() {
        let doc = Kvlm::parse(b"tree abc\n\n").unwrap();
        assert_eq!(doc.message(), b"");
    }

    #[test]
    fn parse_empty_value() {
        let doc = Kvlm::parse(b"encoding \n\nmsg").unwrap();
        assert_eq!(doc.get_first(b"encoding").unwrap(), b"");
    }

    #[test]
    fn three_repeats_stay_in_order() {
        let doc = Kvlm::parse(b"parent a\nparent b\nparent c\n\n").unwrap();
        assert_eq!(
            doc.get_all(b"parent"),
            &[b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]
        );
    }

    #[test]
    fn missing_blank_line_rejected() {
        assert!(matches!(
            Kvlm::parse(b"tree abc\n"),
            Err(CodecError::MalformedKvlm { .. })
        ));
        assert!(matches!(
            Kvlm::parse(b""),
            Err(CodecError::MalformedKvlm { .. })
        ));
    }

    #[test]
    fn line_without_space_rejected() {
        let err = Kvlm::parse(b"tree abc\nbogus\n\nmsg").unwrap_err();
        assert_eq!(
            err,
            CodecError::MalformedKvlm {
                offset: 9,
                reason: "expected blank line before message".into()
            }
        );
    }

    #[test]
    fn unterminated_value_rejected() {
        assert!(matches!(
            Kvlm::parse(b"tree abc"),
            Err(CodecError::MalformedKvlm { .. })
        ));
    }

    #[test]
    fn stray_continuation_rejected() {
        assert!(matches!(
            Kvlm::parse(b" orphan\n\nmsg"),
            Err(CodecError::MalformedKvlm { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Building and serializing
    // -----------------------------------------------------------------------

    #[test]
    fn push_promotes_to_list() {
        let mut doc = Kvlm::new();
        doc.push("parent", "a").unwrap();
        assert!(matches!(doc.get(b"parent"), Some(KvlmValue::Single(_))));
        doc.push("parent", "b").unwrap();
        assert_eq!(doc.get_all(b"parent"), &[b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut doc = Kvlm::new();
        doc.push("tree", "t1").unwrap();
        doc.push("author", "me").unwrap();
        doc.set("tree", "t2").unwrap();
        let keys: Vec<&[u8]> = doc.keys().collect();
        let expected: &[&[u8]] = &[b"tree", b"author"];
        assert_eq!(keys, expected);
        assert_eq!(doc.get_first(b"tree").unwrap(), b"t2");
    }

    #[test]
    fn remove_field() {
        let mut doc = Kvlm::new();
        doc.push("a", "1").unwrap();
        assert!(doc.remove(b"a").is_some());
        assert!(doc.remove(b"a").is_none());
        assert!(doc.get(b"a").is_none());
    }

    #[test]
    fn invalid_keys_rejected() {
        let mut doc = Kvlm::new();
        assert!(doc.push("", "v").is_err());
        assert!(doc.push("two words", "v").is_err());
        assert!(doc.push("line\nbreak", "v").is_err());
    }

    #[test]
    fn serialize_wraps_multiline_values() {
        let mut doc = Kvlm::new();
        doc.push("sig", "line1\nline2").unwrap();
        doc.set_message("msg\n");
        assert_eq!(doc.serialize(), b"sig line1\n line2\n\nmsg\n");
    }

    #[test]
    fn serialize_groups_repeated_keys() {
        let doc = Kvlm::parse(b"parent a\nauthor x\nparent b\n\n").unwrap();
        assert_eq!(doc.serialize(), b"parent a\nparent b\nauthor x\n\n");
    }

    fn arb_doc() -> impl Strategy<Value = Kvlm> {
        (
            prop::collection::vec(
                ("[a-z]{1,6}", prop::collection::vec(any::<u8>(), 0..40)),
                0..8,
            ),
            prop::collection::vec(any::<u8>(), 0..80),
        )
            .prop_map(|(fields, message)| {
                let mut doc = Kvlm::new();
                for (key, value) in fields {
                    doc.push(key, value).unwrap();
                }
                doc.set_message(message);
                doc
            })
    }

    proptest! {
        #[test]
        fn parse_serialize_roundtrip(doc in arb_doc()) {
            let raw = doc.serialize();
            let parsed = Kvlm::parse(&raw).unwrap();
            prop_assert_eq!(&parsed, &doc);
            prop_assert_eq!(parsed.serialize(), raw);
        }
    }
}
