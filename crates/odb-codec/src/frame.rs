//! Object framing: `<kind> <decimal len>\0<payload>`.
//!
//! The framed bytes are both what gets hashed into an [`ObjectId`] and what
//! gets compressed onto disk. The declared length is the only integrity guard
//! besides the hash itself.

use odb_types::{ObjectId, ObjectKind};

use crate::error::{CodecError, CodecResult};

/// Wrap `payload` in a frame header for `kind`.
pub fn frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let len = payload.len().to_string();
    let mut framed = Vec::with_capacity(kind.as_bytes().len() + 1 + len.len() + 1 + payload.len());
    framed.extend_from_slice(kind.as_bytes());
    framed.push(b' ');
    framed.extend_from_slice(len.as_bytes());
    framed.push(0);
    framed.extend_from_slice(payload);
    framed
}

/// The content address of framed bytes: their SHA-1 digest.
pub fn identify(framed: &[u8]) -> ObjectId {
    ObjectId::digest(framed)
}

/// Split framed bytes into their kind and payload.
///
/// The declared length must equal the number of bytes after the NUL. The
/// length is checked before the type token is interpreted.
pub fn unframe(framed: &[u8]) -> CodecResult<(ObjectKind, &[u8])> {
    let space = framed
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| malformed("missing type terminator"))?;
    let nul = framed[space..]
        .iter()
        .position(|&b| b == 0)
        .map(|i| space + i)
        .ok_or_else(|| malformed("missing length terminator"))?;

    let len_field = &framed[space + 1..nul];
    if len_field.is_empty() || !len_field.iter().all(u8::is_ascii_digit) {
        return Err(malformed(format!(
            "length field is not a decimal number: {:?}",
            String::from_utf8_lossy(len_field)
        )));
    }
    // All-digit ASCII is valid UTF-8; parse fails only on overflow.
    let declared: usize = std::str::from_utf8(len_field)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| malformed("length field overflows"))?;

    let payload = &framed[nul + 1..];
    if declared != payload.len() {
        return Err(malformed(format!(
            "declared length {declared} but payload is {} bytes",
            payload.len()
        )));
    }

    let kind = ObjectKind::from_token(&framed[..space])?;
    Ok((kind, payload))
}

fn malformed(reason: impl Into<String>) -> CodecError {
    CodecError::MalformedObject {
        reason: reason.into(),
    }
}
