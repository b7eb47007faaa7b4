//! Core data model types for reconciliation.
//!
//! Spreadsheet content is loaded into a [`Sheet`] of typed [`CellValue`]s. The reference document
//! yields an [`ExpectedFieldSet`], the header row yields a [`ColumnMapping`], and every data row
//! that carries at least one value becomes a [`Record`].

use std::fmt;

use chrono::NaiveDateTime;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

/// Cached result of a formula cell, as stored in the workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaResult {
    /// No cached result was stored.
    Empty,
    /// Numeric result.
    Number(f64),
    /// Text result.
    Text(String),
    /// Boolean result.
    Boolean(bool),
    /// Error result such as `#DIV/0!`.
    Error(String),
}

/// A single spreadsheet cell, tagged by its declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Missing or blank cell.
    Empty,
    /// Text cell.
    Text(String),
    /// Plain numeric cell.
    Number(f64),
    /// Boolean cell.
    Boolean(bool),
    /// Numeric cell formatted as a date and/or time.
    Temporal(NaiveDateTime),
    /// Formula cell with its cached result.
    Formula(FormulaResult),
    /// Any kind the engine does not render (literal error cells, for example).
    Unsupported,
}

/// One sheet of cells in absolute coordinates.
///
/// `rows[r][c]` is the cell at zero-based row `r`, column `c`. A row the source file does not
/// contain at all is stored as an empty `Vec`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    /// Row-major cell storage.
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create a sheet from rows.
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// The first row, unless it is absent.
    pub fn header(&self) -> Option<&[CellValue]> {
        self.rows
            .first()
            .filter(|row| !row.is_empty())
            .map(Vec::as_slice)
    }

    /// Every row after the header.
    pub fn data_rows(&self) -> &[Vec<CellValue>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Number of rows, including the header and absent rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Field names the reference document expects each record to carry.
///
/// Names keep the reference document's order and casing; lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpectedFieldSet {
    names: Vec<String>,
}

impl ExpectedFieldSet {
    /// Build a field set, dropping exact duplicates.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !out.contains(&name) {
                out.push(name);
            }
        }
        Self { names: out }
    }

    /// Iterate field names in reference order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of expected fields.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no field is expected.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Case-insensitive lookup returning the reference spelling of `name`.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let folded = fold_name(name);
        self.names
            .iter()
            .find(|n| fold_name(n) == folded)
            .map(String::as_str)
    }
}

/// One non-empty header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderColumn {
    /// Zero-based column index in the sheet.
    pub index: usize,
    /// Trimmed header text, original casing.
    pub name: String,
    /// Case-folded form used for matching.
    pub folded: String,
}

/// Column index → header name table built from the header row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnMapping {
    columns: Vec<HeaderColumn>,
}

impl ColumnMapping {
    /// Create a mapping from header columns (ordered by index).
    pub fn new(columns: Vec<HeaderColumn>) -> Self {
        Self { columns }
    }

    /// Iterate mapped columns in index order.
    pub fn columns(&self) -> impl Iterator<Item = &HeaderColumn> {
        self.columns.iter()
    }

    /// Number of mapped columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if no column is mapped.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns `true` if some header matches `name` case-insensitively.
    pub fn contains(&self, name: &str) -> bool {
        let folded = fold_name(name);
        self.columns.iter().any(|c| c.folded == folded)
    }
}

/// Case-fold a field or header name for comparison.
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One output record: field name → canonical string value.
///
/// Fields whose cell was empty are absent rather than stored as `""`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, replacing any earlier value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields
            .insert(name.into(), serde_json::Value::String(value.into()));
    }

    /// Value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(serde_json::Value::as_str)
    }

    /// Iterate `(field, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
    }

    /// Number of fields set.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert into a JSON object.
    pub fn into_json(self) -> serde_json::Value {
        serde_json::Value::Object(self.fields)
    }
}

/// Known fields of the fixed store record shape, in serialization order.
pub const STORE_FIELDS: [&str; 5] = ["template", "name", "address", "logo", "email"];

/// The fixed record shape used by [`crate::execution::ReconcileMode::FixedShapeStrict`].
///
/// Unknown keys are kept in `extra` so a round trip never loses data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoreRecord {
    #[serde(default, deserialize_with = "scalar_as_string", skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string", skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Accept any JSON scalar for a known store field; numbers and booleans keep their JSON text.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_json::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(serde_json::Value::Array(_)) => Err(de::Error::invalid_type(Unexpected::Seq, &"a scalar")),
        Some(serde_json::Value::Object(_)) => Err(de::Error::invalid_type(Unexpected::Map, &"a scalar")),
    }
}

impl StoreRecord {
    /// Names of every non-null field, known fields first.
    pub fn present_fields(&self) -> Vec<String> {
        let known = [
            &self.template,
            &self.name,
            &self.address,
            &self.logo,
            &self.email,
        ];
        STORE_FIELDS
            .iter()
            .zip(known)
            .filter(|(_, v)| v.is_some())
            .map(|(k, _)| k.to_string())
            .chain(
                self.extra
                    .iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, _)| k.clone()),
            )
            .collect()
    }

    /// Build a store record from a spreadsheet record.
    ///
    /// Known fields are matched case-insensitively; everything else lands in `extra`.
    pub fn from_record(record: &Record) -> Self {
        let mut out = Self::default();
        for (field, value) in record.iter() {
            let slot = match fold_name(field).as_str() {
                "template" => &mut out.template,
                "name" => &mut out.name,
                "address" => &mut out.address,
                "logo" => &mut out.logo,
                "email" => &mut out.email,
                _ => {
                    out.extra
                        .insert(field.to_string(), serde_json::Value::String(value.to_string()));
                    continue;
                }
            };
            *slot = Some(value.to_string());
        }
        out
    }
}

/// Lenient mode: expected fields the spreadsheet does not provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumnsWarning {
    /// Missing field names, reference casing and order.
    pub missing: Vec<String>,
}

impl fmt::Display for MissingColumnsWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "missing columns in spreadsheet (continuing without them): {}",
            self.missing.join(", ")
        )
    }
}
