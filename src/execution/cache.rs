//! Single-slot cache of the most recent reconciliation output.

use std::sync::{PoisonError, RwLock};

use crate::processing::assemble::{empty_document, serialize_document};

/// A serialized output document, ready to hand to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedOutput {
    /// Serialized JSON document.
    pub bytes: Vec<u8>,
    /// Top-level key of the replaced collection.
    pub collection_key: String,
}

impl CachedOutput {
    /// Content type of [`Self::bytes`].
    pub const CONTENT_TYPE: &'static str = "application/json";

    /// The empty-collection document `{"<key>": []}`.
    pub fn empty(collection_key: &str) -> Self {
        // Serializing an in-memory `Value` cannot fail.
        let bytes = serialize_document(&empty_document(collection_key), false).unwrap_or_default();
        Self {
            bytes,
            collection_key: collection_key.to_string(),
        }
    }

    /// Content type to send with the bytes.
    pub fn content_type(&self) -> &'static str {
        Self::CONTENT_TYPE
    }

    /// Suggested filename for client-side saving, e.g. `updated_stores.json`.
    pub fn filename(&self) -> String {
        format!("updated_{}.json", self.collection_key)
    }
}

/// Engine-wide single-slot cache of the most recent output.
///
/// One slot per [`crate::execution::Reconciler`]; a transport is expected to share one engine.
/// Each `store` and `retrieve` is atomic, but there is no per-caller isolation: the last writer
/// wins, and a caller may retrieve another caller's output.
#[derive(Debug)]
pub struct ResultCache {
    slot: RwLock<Option<CachedOutput>>,
    empty_key: String,
}

impl ResultCache {
    /// Create an empty cache whose default output uses `empty_key`.
    pub fn new(empty_key: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(None),
            empty_key: empty_key.into(),
        }
    }

    /// Overwrite whatever was cached.
    pub fn store(&self, output: CachedOutput) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(output);
    }

    /// The cached output, or `{"<empty_key>": []}` if nothing was stored yet.
    pub fn retrieve(&self) -> CachedOutput {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(output) => output.clone(),
            None => CachedOutput::empty(&self.empty_key),
        }
    }

    /// Returns `true` if nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}
