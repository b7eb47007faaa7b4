//! Schema inference from the reference document.
//!
//! Two policies are supported:
//!
//! - [`infer_fixed_shape`]: a known top-level key holds an array of [`StoreRecord`]s; the expected
//!   fields are the non-null fields of the first record.
//! - [`infer_auto_discovery`]: the first top-level key (in document order) whose value is a
//!   non-empty array of objects is the target; the expected fields are every key of its first
//!   element.

use serde_json::Value as JsonValue;

use crate::error::{ReconcileError, ReconcileResult};
use crate::types::{ExpectedFieldSet, StoreRecord};

/// The collection a reference document will have replaced, plus its expected fields.
#[derive(Debug, Clone, PartialEq)]
pub struct InferredCollection {
    /// Top-level key holding the collection.
    pub key: String,
    /// Fields each record is expected to carry.
    pub fields: ExpectedFieldSet,
}

/// Infer expected fields from the fixed store shape under `collection_key`.
pub fn infer_fixed_shape(document: &JsonValue, collection_key: &str) -> ReconcileResult<InferredCollection> {
    let empty = |reason: &str| ReconcileError::EmptyReferenceCollection {
        key: collection_key.to_string(),
        reason: reason.to_string(),
    };

    let root = document.as_object().ok_or_else(|| ReconcileError::SchemaInference {
        message: "reference document must be a json object".to_string(),
    })?;
    let items = match root.get(collection_key) {
        None | Some(JsonValue::Null) => return Err(empty("is missing")),
        Some(JsonValue::Array(items)) => items,
        Some(_) => return Err(empty("is not an array")),
    };
    let first = items
        .first()
        .ok_or_else(|| empty("must contain at least one entry"))?;

    if !first.is_object() {
        return Err(ReconcileError::SchemaInference {
            message: format!("first entry of '{collection_key}' is not a json object"),
        });
    }
    let record: StoreRecord =
        serde_json::from_value(first.clone()).map_err(|e| ReconcileError::SchemaInference {
            message: format!("first entry of '{collection_key}' is not a store record: {e}"),
        })?;
    let fields = ExpectedFieldSet::from_names(record.present_fields());
    if fields.is_empty() {
        return Err(ReconcileError::SchemaInference {
            message: format!("first entry of '{collection_key}' has no non-null fields"),
        });
    }

    Ok(InferredCollection {
        key: collection_key.to_string(),
        fields,
    })
}

/// Locate the first top-level array of objects and sample its first element's keys.
pub fn infer_auto_discovery(document: &JsonValue) -> ReconcileResult<InferredCollection> {
    let root = document.as_object().ok_or_else(|| ReconcileError::SchemaInference {
        message: "reference document must be a json object".to_string(),
    })?;

    let (key, first) = root
        .iter()
        .find_map(|(key, value)| match value {
            JsonValue::Array(items) if is_array_of_objects(items) => {
                items.first().and_then(JsonValue::as_object).map(|first| (key, first))
            }
            _ => None,
        })
        .ok_or_else(|| ReconcileError::SchemaInference {
            message: "no top-level field holds a non-empty array of objects".to_string(),
        })?;

    if first.is_empty() {
        return Err(ReconcileError::SchemaInference {
            message: format!("first element of '{key}' has no fields"),
        });
    }

    Ok(InferredCollection {
        key: key.clone(),
        fields: ExpectedFieldSet::from_names(first.keys().cloned()),
    })
}

fn is_array_of_objects(items: &[JsonValue]) -> bool {
    !items.is_empty() && items.iter().all(JsonValue::is_object)
}
