use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_cbor::{to_vec, value::to_value};
use serde_json::Value;
use thiserror::Error;

/// Key under which in-progress form values are kept.
pub const FORM_VALUES_KEY: &str = "form-values";
/// Key under which user-edited schema text is kept.
pub const CUSTOM_SCHEMA_KEY: &str = "custom-schema";
pub const DRAFT_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("draft storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode draft: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to encode draft as CBOR: {0}")]
    Cbor(#[source] serde_cbor::Error),
    #[error("draft key '{0}' must be non-empty and use only letters, digits, '-' or '_'")]
    InvalidKey(String),
}

/// Saved copy of a value snapshot (or schema text) with the time it was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    pub values: Value,
    pub saved_at: DateTime<Utc>,
    pub version: String,
}

impl DraftRecord {
    pub fn new(values: Value, saved_at: DateTime<Utc>) -> Self {
        Self {
            values,
            saved_at,
            version: DRAFT_FORMAT_VERSION.to_string(),
        }
    }

    /// Record stamped with the current time.
    pub fn now(values: Value) -> Self {
        Self::new(values, Utc::now())
    }

    /// True when there is nothing worth restoring.
    pub fn is_empty(&self) -> bool {
        match &self.values {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::String(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Serializes the record as canonical CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        let canonical = to_value(self)?;
        to_vec(&canonical)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, serde_cbor::Error> {
        serde_cbor::from_slice(bytes)
    }

    /// Serializes the record as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Key-value persistence port for drafts.
///
/// Implementations treat unreadable entries as absent rather than failing.
pub trait DraftStore {
    fn load(&self, key: &str) -> Result<Option<DraftRecord>, DraftError>;
    fn save(&mut self, key: &str, record: &DraftRecord) -> Result<(), DraftError>;
    /// Removes a draft; returns whether one existed.
    fn clear(&mut self, key: &str) -> Result<bool, DraftError>;
}

/// Rejects keys that could escape a storage namespace.
pub fn ensure_valid_key(key: &str) -> Result<(), DraftError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(DraftError::InvalidKey(key.to_string()))
    }
}

/// In-process store keeping CBOR-encoded records.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the raw bytes for `key`.
    pub fn insert_raw(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(key.into(), bytes);
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self, key: &str) -> Result<Option<DraftRecord>, DraftError> {
        ensure_valid_key(key)?;
        let Some(bytes) = self.entries.get(key) else {
            return Ok(None);
        };
        match DraftRecord::from_cbor(bytes) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                tracing::warn!(%key, error = %err, "ignoring unreadable draft");
                Ok(None)
            }
        }
    }

    fn save(&mut self, key: &str, record: &DraftRecord) -> Result<(), DraftError> {
        ensure_valid_key(key)?;
        let bytes = record.to_cbor().map_err(DraftError::Cbor)?;
        self.entries.insert(key.to_string(), bytes);
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<bool, DraftError> {
        ensure_valid_key(key)?;
        Ok(self.entries.remove(key).is_some())
    }
}
