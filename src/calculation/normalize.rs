//! Employee identifier normalization.
//!
//! Every source spells employee keys its own way: spreadsheets turn `1001`
//! into `1001.0`, hand-edited sheets add padding, and missing values show up
//! as `nan` or `None`. These functions map all of them onto one canonical
//! [`EmployeeKey`] so keys from different sources can be compared.

use std::collections::BTreeSet;

use crate::models::{CellValue, EmployeeKey, Table};

/// Textual markers treated as a missing key, compared case-insensitively.
const MISSING_MARKERS: [&str; 5] = ["", "nan", "none", "null", "nat"];

/// Normalizes a textual employee key.
///
/// Trims whitespace, strips a trailing fractional artifact from numeric
/// keys (`"123.0"` becomes `"123"`), and maps sentinel markers to `None`.
/// Applying it to its own output returns the same key.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::calculation::normalize_key_text;
///
/// assert_eq!(normalize_key_text(" 1001.0 ").unwrap().as_str(), "1001");
/// assert_eq!(normalize_key_text("A-17").unwrap().as_str(), "A-17");
/// assert!(normalize_key_text("NaN").is_none());
/// assert!(normalize_key_text("   ").is_none());
/// ```
pub fn normalize_key_text(raw: &str) -> Option<EmployeeKey> {
    let trimmed = raw.trim();
    if MISSING_MARKERS
        .iter()
        .any(|marker| trimmed.eq_ignore_ascii_case(marker))
    {
        return None;
    }
    Some(EmployeeKey::from_canonical(strip_zero_fraction(trimmed).to_string()))
}

/// Normalizes a key cell of any representation.
///
/// Numeric cells lose their fractional zeros; date cells are never keys.
pub fn normalize_key(cell: &CellValue) -> Option<EmployeeKey> {
    match cell {
        CellValue::Empty | CellValue::Date(_) => None,
        CellValue::Text(text) => normalize_key_text(text),
        CellValue::Number(n) => normalize_key_text(&n.normalize().to_string()),
    }
}

/// Collects the normalized keys of one column, discarding absent markers.
pub fn key_set(table: &Table, column: usize) -> BTreeSet<EmployeeKey> {
    table.column_values(column).filter_map(normalize_key).collect()
}

/// `"123.000"` -> `"123"`; anything else is returned unchanged.
fn strip_zero_fraction(value: &str) -> &str {
    match value.split_once('.') {
        Some((whole, fraction))
            if !whole.is_empty()
                && whole.chars().all(|c| c.is_ascii_digit())
                && !fraction.is_empty()
                && fraction.chars().all(|c| c == '0') =>
        {
            whole
        }
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn text_of(key: Option<EmployeeKey>) -> Option<String> {
        key.map(|k| k.as_str().to_string())
    }

    #[test]
    fn test_trailing_zero_fraction_is_stripped() {
        assert_eq!(text_of(normalize_key_text("123.0")), Some("123".to_string()));
        assert_eq!(text_of(normalize_key_text("123.000")), Some("123".to_string()));
    }

    #[test]
    fn test_non_zero_fraction_is_kept() {
        assert_eq!(text_of(normalize_key_text("123.5")), Some("123.5".to_string()));
    }

    #[test]
    fn test_textual_codes_are_only_trimmed() {
        assert_eq!(text_of(normalize_key_text("  AB.0 ")), Some("AB.0".to_string()));
        assert_eq!(text_of(normalize_key_text("0042")), Some("0042".to_string()));
    }

    #[test]
    fn test_sentinels_are_absent_case_insensitively() {
        for marker in ["nan", "NaN", "None", "NULL", "NaT", "", "  "] {
            assert!(normalize_key_text(marker).is_none(), "{marker:?} should be absent");
        }
    }

    #[test]
    fn test_numeric_cells_normalize_like_text() {
        let cell = CellValue::Number(Decimal::from_str("34567.0").unwrap());
        assert_eq!(text_of(normalize_key(&cell)), Some("34567".to_string()));
        assert_eq!(
            normalize_key(&cell),
            normalize_key(&CellValue::text("34567"))
        );
    }

    #[test]
    fn test_empty_and_date_cells_are_absent() {
        assert!(normalize_key(&CellValue::Empty).is_none());
        let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(normalize_key(&CellValue::Date(date)).is_none());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for raw in ["1001.0", " 77 ", "X-1", "5.50"] {
            let once = normalize_key_text(raw).unwrap();
            let twice = normalize_key_text(once.as_str()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_key_set_discards_absent_markers() {
        let table = Table::with_rows(
            ["MATRICULA"],
            vec![
                vec![CellValue::text("1001")],
                vec![CellValue::text("nan")],
                vec![CellValue::Empty],
                vec![CellValue::text("1001.0")],
                vec![CellValue::text("1002")],
            ],
        );
        let keys = key_set(&table, 0);
        assert_eq!(keys.len(), 2);
    }
}
