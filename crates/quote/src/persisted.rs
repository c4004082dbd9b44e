//! On-disk format of the cart slot.
//!
//! Current payloads are a versioned envelope:
//!
//! ```json
//! { "version": 1, "items": [ { "id": "...", "price": "100000", "quantity": 2, ... } ] }
//! ```
//!
//! The browser app stored a bare array of items. That shape is still read
//! and treated as version 0.
//!
//! Entries are decoded one at a time. An entry that does not match the item
//! shape is skipped with a warning, and the rest of the cart still loads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use yotech_quote_core::LineItem;

/// Version written by [`encode`].
pub const SCHEMA_VERSION: u32 = 1;

/// Errors decoding or encoding a cart payload.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The payload is not valid JSON or the envelope is malformed.
    #[error("malformed cart payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload is JSON but neither an envelope nor an item array.
    #[error("unrecognised cart payload shape")]
    UnknownShape,

    /// The envelope was written by a newer schema.
    #[error("unsupported cart schema version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    items: Vec<&'a LineItem>,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    #[serde(default)]
    items: Vec<Value>,
}

/// Serialize items into the current envelope.
///
/// # Errors
///
/// Returns [`PersistError::Malformed`] if serialization fails.
pub fn encode<'a>(items: impl IntoIterator<Item = &'a LineItem>) -> Result<String, PersistError> {
    let envelope = EnvelopeRef {
        version: SCHEMA_VERSION,
        items: items.into_iter().collect(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse a stored payload of any supported version.
///
/// Items are returned in stored order. Unreadable and zero-quantity entries
/// are dropped, and a repeated id keeps its first position with the last
/// stored value.
///
/// # Errors
///
/// Returns an error if the payload is not JSON, has an unknown shape, or was
/// written by a newer schema version.
pub fn decode(raw: &str) -> Result<Vec<LineItem>, PersistError> {
    let value: Value = serde_json::from_str(raw)?;
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(_) => {
            let envelope: Envelope = serde_json::from_value(value)?;
            if envelope.version > SCHEMA_VERSION {
                return Err(PersistError::UnsupportedVersion(envelope.version));
            }
            envelope.items
        }
        _ => return Err(PersistError::UnknownShape),
    };

    let mut unique = indexmap::IndexMap::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<LineItem>(entry) {
            Ok(item) if item.is_present() => {
                unique.insert(item.id.clone(), item);
            }
            Ok(_) => {}
            Err(e) => warn!(index, error = %e, "Skipping unreadable cart entry"),
        }
    }
    Ok(unique.into_values().collect())
}
