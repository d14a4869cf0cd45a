//! Typed management payloads and their decoders.

pub mod departed;
pub mod payloads;

use serde::de::DeserializeOwned;

use crate::core::errors::{MonError, Result};

/// Decode one payload, tagging failures with `context`.
pub fn decode<T: DeserializeOwned>(context: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| MonError::Decode {
        context: context.to_string(),
        details: e.to_string(),
    })
}

/// Decode an `{"items": [...]}` envelope. An empty body decodes to no items.
pub fn decode_items<T: DeserializeOwned>(context: &str, bytes: &[u8]) -> Result<Vec<T>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let envelope: payloads::Items<T> = decode(context, bytes)?;
    Ok(envelope.items)
}
