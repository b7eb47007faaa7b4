//! Reference document parsing.
//!
//! The reference document is parsed into an order-preserving [`serde_json::Value`] tree so that
//! auto-discovery sees top-level fields in document order and the output keeps that order.

use std::fs;
use std::path::Path;

use crate::error::{ReconcileError, ReconcileResult};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse reference document bytes.
pub fn parse_reference(bytes: &[u8]) -> ReconcileResult<serde_json::Value> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ReconcileError::SchemaInference {
            message: "reference document is empty".to_string(),
        });
    }
    Ok(serde_json::from_slice(bytes)?)
}

/// Read and parse a reference document from disk.
pub fn parse_reference_from_path(path: impl AsRef<Path>) -> ReconcileResult<serde_json::Value> {
    let bytes = fs::read(path)?;
    parse_reference(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_or_without_bom() {
        let v = parse_reference(b"\xEF\xBB\xBF{\"data\": []}").unwrap();
        assert!(v["data"].is_array());
    }

    #[test]
    fn rejects_blank_and_malformed_input() {
        let err = parse_reference(b"  \n").unwrap_err();
        assert!(err.to_string().contains("empty"));

        let err = parse_reference(b"{\"data\": [").unwrap_err();
        assert!(matches!(err, ReconcileError::Json(_)));
    }
}
