//! In-memory tables exchanged with the table loader and writer.
//!
//! Sources arrive as loosely-typed spreadsheets: headers are inconsistently
//! labelled, rows may be ragged, and the same column can mix text, numbers and
//! dates. [`Table`] keeps that shape intact and offers tolerant accessors; the
//! pipeline stages decide what each column means.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

/// Date layouts accepted for textual date cells, tried in order.
///
/// Day-first layouts come before ISO because the source spreadsheets are
/// filled in by hand with `dd/mm/yyyy` dates.
const DATE_FORMATS: [&str; 5] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"];

/// Largest serial number Excel can represent (9999-12-31).
const MAX_EXCEL_SERIAL: i64 = 2_958_465;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// No value.
    Empty,
    /// Free text, kept as read.
    Text(String),
    /// A numeric cell.
    Number(Decimal),
    /// A cell the source already typed as a calendar date.
    Date(NaiveDate),
}

impl CellValue {
    /// Builds a text cell, mapping blank input to [`CellValue::Empty`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    /// Returns true for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Renders the cell as trimmed text, or `None` when blank.
    ///
    /// Numbers are rendered without trailing zeros and dates as ISO-8601.
    ///
    /// # Example
    ///
    /// ```
    /// use meal_benefit_engine::models::CellValue;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(CellValue::Number(Decimal::new(12340, 1)).as_text().as_deref(), Some("1234"));
    /// assert_eq!(CellValue::text("  SINDPD SP ").as_text().as_deref(), Some("SINDPD SP"));
    /// assert_eq!(CellValue::Empty.as_text(), None);
    /// ```
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            CellValue::Number(n) => Some(n.normalize().to_string()),
            CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Interprets the cell as a decimal number.
    ///
    /// Text cells accept both `1234.56` and the Brazilian `1.234,56` layouts,
    /// with an optional `R$` prefix.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_decimal_text(s),
            _ => None,
        }
    }

    /// Interprets the cell as a calendar date.
    ///
    /// Numeric cells are read as Excel serial dates (1900 date system).
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::Text(s) => parse_date_text(s),
            CellValue::Number(n) => excel_serial_to_date(*n),
            CellValue::Empty => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => write!(f, "{}", text),
            None => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

impl From<Decimal> for CellValue {
    fn from(value: Decimal) -> Self {
        CellValue::Number(value)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Number(Decimal::from(value))
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Empty, Into::into)
    }
}

/// A rectangular table with canonical (trimmed, uppercased) headers.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::models::{CellValue, Table};
///
/// let mut table = Table::new(["  matricula ", "Sindicato"]);
/// table.push_row(vec![CellValue::text("1001")]);
///
/// assert_eq!(table.columns(), ["MATRICULA", "SINDICATO"]);
/// assert_eq!(table.cell(0, 1), &CellValue::Empty);
/// assert_eq!(table.find_column(&["SINDICATO"]), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Creates an empty table, canonicalizing every header.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|c| canonical_header(c.as_ref()))
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Creates a table and appends the given rows.
    pub fn with_rows<I, S>(columns: I, rows: Vec<Vec<CellValue>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Appends a row, padding short rows with empty cells and truncating long ones.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    /// Returns the canonical headers.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns all rows.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Finds the first header matching any alias, ignoring case, accents and spacing.
    pub fn find_column<S: AsRef<str>>(&self, aliases: &[S]) -> Option<usize> {
        let folded: Vec<String> = self.columns.iter().map(|c| fold_label(c)).collect();
        aliases.iter().find_map(|alias| {
            let wanted = fold_label(alias.as_ref());
            folded.iter().position(|c| *c == wanted)
        })
    }

    /// Returns the cell at `(row, column)`, or an empty cell when out of range.
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Iterates over every value of one column.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(column).unwrap_or(&EMPTY_CELL))
    }

    /// Returns a copy holding only the first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

/// Canonicalizes a header: trimmed and uppercased.
pub fn canonical_header(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Canonicalizes a free-text label for matching.
///
/// Uppercases, strips Portuguese diacritics and collapses runs of whitespace,
/// so `"Sindpd  São Paulo "` and `"SINDPD SAO PAULO"` compare equal.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::models::fold_label;
///
/// assert_eq!(fold_label(" Admissão "), "ADMISSAO");
/// assert_eq!(fold_label("sindpd   são paulo"), "SINDPD SAO PAULO");
/// ```
pub fn fold_label(raw: &str) -> String {
    let upper: String = raw.to_uppercase().chars().map(fold_char).collect();
    upper.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold_char(c: char) -> char {
    match c {
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'Ç' => 'C',
        'Ñ' => 'N',
        other => other,
    }
}

fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

fn parse_decimal_text(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // 1.234,56
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        // 1,234.56
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };
    Decimal::from_str(&normalized).ok()
}

fn excel_serial_to_date(serial: Decimal) -> Option<NaiveDate> {
    let days = serial.trunc().to_i64()?;
    if !(1..=MAX_EXCEL_SERIAL).contains(&days) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(u64::try_from(days).ok()?))
}
