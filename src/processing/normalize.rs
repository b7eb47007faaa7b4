//! Cell value normalization.
//!
//! [`normalize_cell`] is a total function over [`CellValue`]: every kind maps to a canonical
//! string, and nothing in here can fail.

use crate::types::{CellValue, FormulaResult};

/// Canonical rendering for temporal cells (ISO-8601 local date-time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Convert one cell into its canonical string.
///
/// - empty → `""`
/// - text → as-is (no trimming)
/// - number → integral values without fraction or exponent, others as plain decimals
/// - boolean → `"true"` / `"false"`
/// - temporal → [`TIMESTAMP_FORMAT`]
/// - formula → cached numeric result, else cached result as text
/// - unsupported → `""`
pub fn normalize_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => String::new(),
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => format_number(*n),
        CellValue::Boolean(b) => b.to_string(),
        CellValue::Temporal(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
        CellValue::Formula(result) => formula_as_number(result).unwrap_or_else(|| formula_as_text(result)),
        CellValue::Unsupported => String::new(),
    }
}

/// Render a number without scientific notation.
///
/// `42.0` → `"42"`, `42.5` → `"42.5"`, `1e21` → `"1000000000000000000000"`.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    if n == n.trunc() {
        // -0.0 would otherwise print as "-0"
        if n == 0.0 {
            return "0".to_string();
        }
        return format!("{n:.0}");
    }
    // `Display` for f64 is the shortest round-trip decimal and never uses an exponent.
    n.to_string()
}

fn formula_as_number(result: &FormulaResult) -> Option<String> {
    match result {
        FormulaResult::Number(n) => Some(format_number(*n)),
        _ => None,
    }
}

fn formula_as_text(result: &FormulaResult) -> String {
    match result {
        FormulaResult::Empty => String::new(),
        FormulaResult::Number(n) => format_number(*n),
        FormulaResult::Text(s) => s.clone(),
        FormulaResult::Boolean(b) => b.to_string(),
        FormulaResult::Error(e) => e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_and_unsupported_render_as_empty_string() {
        assert_eq!(normalize_cell(&CellValue::Empty), "");
        assert_eq!(normalize_cell(&CellValue::Unsupported), "");
    }

    #[test]
    fn text_is_not_trimmed() {
        let cell = CellValue::Text("  Acme  ".to_string());
        assert_eq!(normalize_cell(&cell), "  Acme  ");
    }

    #[test]
    fn integral_numbers_drop_fraction() {
        assert_eq!(normalize_cell(&CellValue::Number(42.0)), "42");
        assert_eq!(normalize_cell(&CellValue::Number(-7.0)), "-7");
        assert_eq!(normalize_cell(&CellValue::Number(-0.0)), "0");
        assert_eq!(normalize_cell(&CellValue::Number(1e21)), "1000000000000000000000");
    }

    #[test]
    fn fractional_numbers_never_use_exponent() {
        assert_eq!(normalize_cell(&CellValue::Number(42.5)), "42.5");
        assert_eq!(normalize_cell(&CellValue::Number(0.0000001)), "0.0000001");
    }

    #[test]
    fn booleans_render_lowercase() {
        assert_eq!(normalize_cell(&CellValue::Boolean(true)), "true");
        assert_eq!(normalize_cell(&CellValue::Boolean(false)), "false");
    }

    #[test]
    fn temporal_uses_canonical_timestamp() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(normalize_cell(&CellValue::Temporal(dt)), "2024-01-15T10:30:00");
    }

    #[test]
    fn formula_prefers_numeric_then_falls_back_to_text() {
        let num = CellValue::Formula(FormulaResult::Number(4.0));
        let text = CellValue::Formula(FormulaResult::Text("Acme".to_string()));
        let boolean = CellValue::Formula(FormulaResult::Boolean(true));
        let error = CellValue::Formula(FormulaResult::Error("#DIV/0!".to_string()));
        let empty = CellValue::Formula(FormulaResult::Empty);

        assert_eq!(normalize_cell(&num), "4");
        assert_eq!(normalize_cell(&text), "Acme");
        assert_eq!(normalize_cell(&boolean), "true");
        assert_eq!(normalize_cell(&error), "#DIV/0!");
        assert_eq!(normalize_cell(&empty), "");
    }

    #[test]
    fn normalization_is_deterministic() {
        let cells = [
            CellValue::Number(3.25),
            CellValue::Text("x".to_string()),
            CellValue::Formula(FormulaResult::Number(1.5)),
        ];
        for cell in &cells {
            assert_eq!(normalize_cell(cell), normalize_cell(cell));
        }
    }
}
