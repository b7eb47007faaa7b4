//! Splice built records back into the reference document and serialize it.

use serde_json::Value as JsonValue;

use crate::error::{ReconcileError, ReconcileResult};
use crate::types::{Record, StoreRecord};

/// Replace `key` with `records` typed as [`StoreRecord`]s. Sibling fields pass through.
pub fn assemble_fixed_shape(document: JsonValue, key: &str, records: Vec<Record>) -> ReconcileResult<JsonValue> {
    let stores: Vec<StoreRecord> = records.iter().map(StoreRecord::from_record).collect();
    let collection = serde_json::to_value(stores)?;
    replace_collection(document, key, collection)
}

/// Replace `key` with `records` as plain JSON objects. Sibling fields pass through.
pub fn assemble_collection(document: JsonValue, key: &str, records: Vec<Record>) -> ReconcileResult<JsonValue> {
    let collection = JsonValue::Array(records.into_iter().map(Record::into_json).collect());
    replace_collection(document, key, collection)
}

fn replace_collection(mut document: JsonValue, key: &str, collection: JsonValue) -> ReconcileResult<JsonValue> {
    let root = document
        .as_object_mut()
        .ok_or_else(|| ReconcileError::SchemaInference {
            message: "reference document must be a json object".to_string(),
        })?;
    // An existing key keeps its position in the document.
    root.insert(key.to_string(), collection);
    Ok(document)
}

/// `{"<key>": []}`
pub fn empty_document(key: &str) -> JsonValue {
    let mut root = serde_json::Map::new();
    root.insert(key.to_string(), JsonValue::Array(Vec::new()));
    JsonValue::Object(root)
}

/// Serialize a document to its byte representation.
pub fn serialize_document(document: &JsonValue, pretty: bool) -> ReconcileResult<Vec<u8>> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(document)?
    } else {
        serde_json::to_vec(document)?
    };
    Ok(bytes)
}
