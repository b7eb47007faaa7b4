//! Header row → [`ColumnMapping`], and validation against the [`ExpectedFieldSet`].

use crate::error::{ReconcileError, ReconcileResult};
use crate::types::{CellValue, ColumnMapping, ExpectedFieldSet, HeaderColumn, MissingColumnsWarning, Sheet, fold_name};

use super::normalize::normalize_cell;

/// How strictly missing expected columns are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnEnforcement {
    /// Any missing expected column fails the call.
    Strict,
    /// Missing columns become a [`MissingColumnsWarning`].
    Lenient,
}

/// Build the column mapping from the sheet's first row.
///
/// Cells whose trimmed text is empty occupy no slot.
pub fn build_column_mapping(sheet: &Sheet) -> ReconcileResult<ColumnMapping> {
    let header = sheet.header().ok_or_else(|| ReconcileError::EmptyHeader {
        message: "spreadsheet must have a header row".to_string(),
    })?;

    let mapping = mapping_from_header(header);
    if mapping.is_empty() {
        return Err(ReconcileError::EmptyHeader {
            message: "no valid columns found in spreadsheet header row".to_string(),
        });
    }
    Ok(mapping)
}

fn mapping_from_header(header: &[CellValue]) -> ColumnMapping {
    let columns = header
        .iter()
        .enumerate()
        .filter_map(|(index, cell)| {
            let text = normalize_cell(cell);
            let name = text.trim();
            if name.is_empty() {
                return None;
            }
            Some(HeaderColumn {
                index,
                name: name.to_string(),
                folded: fold_name(name),
            })
        })
        .collect();
    ColumnMapping::new(columns)
}

/// Expected fields with no matching header, in reference order and casing.
pub fn missing_columns(mapping: &ColumnMapping, expected: &ExpectedFieldSet) -> Vec<String> {
    expected
        .names()
        .filter(|name| !mapping.contains(name))
        .map(str::to_string)
        .collect()
}

/// Check `mapping` against `expected`.
///
/// Extra spreadsheet columns are never an error. Returns a warning in lenient mode when columns
/// are missing; fails with [`ReconcileError::MissingColumns`] in strict mode.
pub fn validate_columns(
    mapping: &ColumnMapping,
    expected: &ExpectedFieldSet,
    enforcement: ColumnEnforcement,
) -> ReconcileResult<Option<MissingColumnsWarning>> {
    let missing = missing_columns(mapping, expected);
    if missing.is_empty() {
        return Ok(None);
    }
    match enforcement {
        ColumnEnforcement::Strict => Err(ReconcileError::MissingColumns { missing }),
        ColumnEnforcement::Lenient => Ok(Some(MissingColumnsWarning { missing })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn sheet_with_header(header: Vec<CellValue>) -> Sheet {
        Sheet::new(vec![header])
    }

    #[test]
    fn empty_header_cells_occupy_no_slot() {
        let sheet = sheet_with_header(vec![text(" Name "), CellValue::Empty, text("   "), text("EMAIL")]);
        let mapping = build_column_mapping(&sheet).unwrap();

        let cols: Vec<(usize, &str, &str)> = mapping
            .columns()
            .map(|c| (c.index, c.name.as_str(), c.folded.as_str()))
            .collect();
        assert_eq!(cols, vec![(0, "Name", "name"), (3, "EMAIL", "email")]);
    }

    #[test]
    fn numeric_headers_are_rendered() {
        let sheet = sheet_with_header(vec![CellValue::Number(2024.0)]);
        let mapping = build_column_mapping(&sheet).unwrap();
        assert!(mapping.contains("2024"));
    }

    #[test]
    fn absent_or_blank_header_fails() {
        let err = build_column_mapping(&Sheet::default()).unwrap_err();
        assert!(matches!(err, ReconcileError::EmptyHeader { .. }));

        let absent_first_row = Sheet::new(vec![vec![], vec![text("name")]]);
        assert!(build_column_mapping(&absent_first_row).is_err());

        let blank = sheet_with_header(vec![CellValue::Empty, text(" ")]);
        let err = build_column_mapping(&blank).unwrap_err();
        assert!(err.to_string().contains("no valid columns"));
    }

    #[test]
    fn strict_mode_lists_every_missing_column_in_reference_casing() {
        let mapping = build_column_mapping(&sheet_with_header(vec![text("name")])).unwrap();
        let expected = ExpectedFieldSet::from_names(["Name", "Address", "email"]);

        let err = validate_columns(&mapping, &expected, ColumnEnforcement::Strict).unwrap_err();
        match &err {
            ReconcileError::MissingColumns { missing } => {
                assert_eq!(missing, &vec!["Address".to_string(), "email".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("Address, email"));
    }

    #[test]
    fn lenient_mode_returns_warning() {
        let mapping = build_column_mapping(&sheet_with_header(vec![text("name")])).unwrap();
        let expected = ExpectedFieldSet::from_names(["name", "email"]);

        let warning = validate_columns(&mapping, &expected, ColumnEnforcement::Lenient).unwrap();
        assert_eq!(
            warning,
            Some(MissingColumnsWarning {
                missing: vec!["email".to_string()]
            })
        );
    }

    #[test]
    fn extra_columns_are_not_an_error() {
        let mapping = build_column_mapping(&sheet_with_header(vec![text("NAME"), text("phone")])).unwrap();
        let expected = ExpectedFieldSet::from_names(["name"]);
        assert_eq!(validate_columns(&mapping, &expected, ColumnEnforcement::Strict).unwrap(), None);
    }
}
