//! Roster extraction and enrichment.
//!
//! Turns the raw roster table into [`EmployeeRecord`]s and attaches the
//! per-employee facts carried by the admission, termination and vacation
//! sources.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::config::{ColumnMap, Vocabulary};
use crate::models::{CellValue, EmployeeKey, EmployeeRecord, Table, TerminationNotice};

use super::normalize::normalize_key;

/// The roster as records, plus what the extraction noticed on the way.
#[derive(Debug, Clone, Default)]
pub struct RosterExtraction {
    /// One record per distinct key, in roster order.
    pub records: Vec<EmployeeRecord>,
    /// Whether the roster has a role-title column.
    pub has_role_column: bool,
    /// Whether the roster has a status column.
    pub has_status_column: bool,
    /// Rows skipped because their key was absent.
    pub missing_keys: usize,
    /// Keys seen more than once, with their occurrence count.
    pub duplicate_keys: BTreeMap<EmployeeKey, usize>,
    /// Non-blank date cells that could not be parsed.
    pub malformed_dates: usize,
    /// Warnings raised during extraction.
    pub warnings: Vec<String>,
}

/// Reads a date cell; non-blank cells that fail to parse are counted and treated as absent.
pub(crate) fn read_date(cell: &CellValue, malformed: &mut usize) -> Option<NaiveDate> {
    if cell.is_blank() {
        return None;
    }
    let date = cell.as_date();
    if date.is_none() {
        *malformed += 1;
    }
    date
}

fn read_text(table: &Table, row: usize, column: Option<usize>) -> Option<String> {
    column.and_then(|c| table.cell(row, c).as_text())
}

fn read_days(cell: &CellValue) -> u32 {
    cell.as_decimal()
        .filter(|d| !d.is_sign_negative())
        .and_then(|d| d.trunc().to_u32())
        .unwrap_or(0)
}

/// Extracts employee records from the roster.
///
/// Rows without a key are skipped; when a key repeats, the first row wins.
/// Both conditions are reported as warnings.
pub fn extract_roster(
    table: &Table,
    columns: &ColumnMap,
    vocabulary: &Vocabulary,
) -> RosterExtraction {
    let aliases = &columns.roster;
    let mut extraction = RosterExtraction::default();

    let Some(key_col) = table.find_column(&aliases.key) else {
        extraction.warnings.push(format!(
            "[STRUCTURE] Roster has no employee key column (expected one of: {}); no employee can be evaluated",
            aliases.key.join(", ")
        ));
        extraction.missing_keys = table.len();
        return extraction;
    };

    let name_col = table.find_column(&aliases.name);
    let company_col = table.find_column(&aliases.company);
    let role_col = table.find_column(&aliases.role_title);
    let status_col = table.find_column(&aliases.status);
    let unit_col = table.find_column(&aliases.unit);
    let admission_col = table.find_column(&aliases.admission_date);
    let termination_date_col = table.find_column(&aliases.termination_date);
    let communicated_col = table.find_column(&aliases.termination_communicated);
    let vacation_col = table.find_column(&aliases.vacation_days);

    extraction.has_role_column = role_col.is_some();
    extraction.has_status_column = status_col.is_some();

    let mut seen: BTreeSet<EmployeeKey> = BTreeSet::new();
    for row in 0..table.len() {
        let Some(key) = normalize_key(table.cell(row, key_col)) else {
            extraction.missing_keys += 1;
            continue;
        };
        if !seen.insert(key.clone()) {
            *extraction.duplicate_keys.entry(key).or_insert(1) += 1;
            continue;
        }

        let mut record = EmployeeRecord::new(key);
        record.name = read_text(table, row, name_col);
        record.company = read_text(table, row, company_col);
        record.role_title = read_text(table, row, role_col);
        record.status = read_text(table, row, status_col);
        record.unit_name = read_text(table, row, unit_col);
        record.admission_date = admission_col
            .and_then(|c| read_date(table.cell(row, c), &mut extraction.malformed_dates));

        let termination_date = termination_date_col
            .and_then(|c| read_date(table.cell(row, c), &mut extraction.malformed_dates));
        let communicated = read_text(table, row, communicated_col);
        if termination_date.is_some() || communicated.is_some() {
            record.termination = Some(TerminationNotice {
                communicated: communicated
                    .as_deref()
                    .is_some_and(|flag| vocabulary.is_termination_affirmative(flag)),
                date: termination_date,
            });
        }

        record.vacation_days = vacation_col
            .map(|c| read_days(table.cell(row, c)))
            .unwrap_or(0);

        extraction.records.push(record);
    }

    if extraction.missing_keys > 0 {
        extraction.warnings.push(format!(
            "[MISSING_KEY] {} roster row(s) have no employee key and were skipped",
            extraction.missing_keys
        ));
    }
    for (key, count) in &extraction.duplicate_keys {
        extraction.warnings.push(format!(
            "[DUPLICATE_KEY] Employee {} appears {} times in the roster; the first row was kept",
            key, count
        ));
    }
    if extraction.malformed_dates > 0 {
        extraction.warnings.push(format!(
            "[MALFORMED_DATE] {} roster date cell(s) could not be parsed and were treated as absent",
            extraction.malformed_dates
        ));
    }

    debug!(
        records = extraction.records.len(),
        missing_keys = extraction.missing_keys,
        duplicates = extraction.duplicate_keys.len(),
        "Extracted roster"
    );

    extraction
}

/// Attaches admission dates from the admission source.
///
/// A date in the admission source replaces the roster's own. Returns the
/// number of malformed date cells seen.
pub fn attach_admissions(
    records: &mut [EmployeeRecord],
    admissions: &Table,
    columns: &ColumnMap,
) -> usize {
    let aliases = &columns.admissions;
    let (Some(key_col), Some(date_col)) = (
        admissions.find_column(&aliases.key),
        admissions.find_column(&aliases.date),
    ) else {
        return 0;
    };

    let mut malformed = 0;
    let mut dates: BTreeMap<EmployeeKey, NaiveDate> = BTreeMap::new();
    for row in 0..admissions.len() {
        let Some(key) = normalize_key(admissions.cell(row, key_col)) else {
            continue;
        };
        if let Some(date) = read_date(admissions.cell(row, date_col), &mut malformed) {
            dates.entry(key).or_insert(date);
        }
    }

    for record in records.iter_mut() {
        if let Some(date) = dates.get(&record.key) {
            record.admission_date = Some(*date);
        }
    }
    malformed
}

/// Attaches termination notices from the termination source.
///
/// Used when terminations are prorated rather than excluded outright. A
/// notice from the source replaces the roster's own. Returns the number of
/// malformed date cells seen.
pub fn attach_terminations(
    records: &mut [EmployeeRecord],
    terminations: &Table,
    columns: &ColumnMap,
    vocabulary: &Vocabulary,
) -> usize {
    let aliases = &columns.terminations;
    let Some(key_col) = terminations.find_column(&aliases.key) else {
        return 0;
    };
    let communicated_col = terminations.find_column(&aliases.communicated);
    let date_col = terminations.find_column(&aliases.date);

    let mut malformed = 0;
    let mut notices: BTreeMap<EmployeeKey, TerminationNotice> = BTreeMap::new();
    for row in 0..terminations.len() {
        let Some(key) = normalize_key(terminations.cell(row, key_col)) else {
            continue;
        };
        let date = date_col.and_then(|c| read_date(terminations.cell(row, c), &mut malformed));
        let communicated = read_text(terminations, row, communicated_col)
            .is_some_and(|flag| vocabulary.is_termination_affirmative(&flag));
        notices
            .entry(key)
            .or_insert(TerminationNotice { communicated, date });
    }

    for record in records.iter_mut() {
        if let Some(notice) = notices.get(&record.key) {
            record.termination = Some(*notice);
        }
    }
    malformed
}

/// Attaches vacation days from the vacation source.
pub fn attach_vacations(records: &mut [EmployeeRecord], vacations: &Table, columns: &ColumnMap) {
    let aliases = &columns.vacations;
    let (Some(key_col), Some(days_col)) = (
        vacations.find_column(&aliases.key),
        vacations.find_column(&aliases.days),
    ) else {
        return;
    };

    let days: BTreeMap<EmployeeKey, u32> = (0..vacations.len())
        .filter_map(|row| {
            normalize_key(vacations.cell(row, key_col))
                .map(|key| (key, read_days(vacations.cell(row, days_col))))
        })
        .collect();

    for record in records.iter_mut() {
        if let Some(d) = days.get(&record.key) {
            record.vacation_days = *d;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn t(s: &str) -> CellValue {
        CellValue::text(s)
    }

    fn create_test_roster() -> Table {
        Table::with_rows(
            [
                "MATRICULA",
                "EMPRESA",
                "TITULO DO CARGO",
                "DESC. SITUACAO",
                "SINDICATO",
            ],
            vec![
                vec![t("1001.0"), t("ACME"), t("ANALISTA"), t("Trabalhando"), t("SINDPD SP")],
                vec![t("nan"), t("ACME"), t("ANALISTA"), t("Trabalhando"), t("SINDPD SP")],
                vec![t("1002"), t("ACME"), t("DIRETOR"), t("Trabalhando"), t("SINDPD RJ")],
                vec![t("1001"), t("OTHER"), t("GERENTE"), t("Trabalhando"), t("SINDPD RS")],
            ],
        )
    }

    #[test]
    fn test_extract_skips_missing_and_duplicate_keys() {
        let extraction = extract_roster(
            &create_test_roster(),
            &ColumnMap::default(),
            &Vocabulary::default(),
        );

        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.missing_keys, 1);
        assert_eq!(extraction.records[0].company.as_deref(), Some("ACME"));
        assert_eq!(extraction.duplicate_keys.values().copied().collect::<Vec<_>>(), vec![2]);
        assert!(extraction.warnings.iter().any(|w| w.starts_with("[MISSING_KEY]")));
        assert!(extraction.warnings.iter().any(|w| w.starts_with("[DUPLICATE_KEY]")));
    }

    #[test]
    fn test_extract_reports_column_presence() {
        let extraction = extract_roster(
            &create_test_roster(),
            &ColumnMap::default(),
            &Vocabulary::default(),
        );
        assert!(extraction.has_role_column);
        assert!(extraction.has_status_column);

        let bare = Table::with_rows(["MATRICULA"], vec![vec![t("1")]]);
        let extraction = extract_roster(&bare, &ColumnMap::default(), &Vocabulary::default());
        assert!(!extraction.has_role_column);
        assert!(!extraction.has_status_column);
        assert_eq!(extraction.records.len(), 1);
    }

    #[test]
    fn test_roster_without_key_column_yields_nothing() {
        let table = Table::with_rows(["NOME"], vec![vec![t("Ana")]]);
        let extraction = extract_roster(&table, &ColumnMap::default(), &Vocabulary::default());
        assert!(extraction.records.is_empty());
        assert!(extraction.warnings[0].starts_with("[STRUCTURE]"));
    }

    #[test]
    fn test_roster_termination_columns_build_notice() {
        let table = Table::with_rows(
            ["MATRICULA", "COMUNICADO DE DESLIGAMENTO", "DATA DEMISSÃO"],
            vec![
                vec![t("1"), t("OK"), t("20/05/2025")],
                vec![t("2"), CellValue::Empty, t("20/05/2025")],
                vec![t("3"), CellValue::Empty, CellValue::Empty],
            ],
        );
        let extraction = extract_roster(&table, &ColumnMap::default(), &Vocabulary::default());

        let first = extraction.records[0].termination.unwrap();
        assert!(first.communicated);
        assert_eq!(first.effective_date(), Some(date(2025, 5, 20)));

        let second = extraction.records[1].termination.unwrap();
        assert!(!second.communicated);
        assert_eq!(second.effective_date(), None);

        assert!(extraction.records[2].termination.is_none());
    }

    #[test]
    fn test_malformed_roster_dates_are_counted() {
        let table = Table::with_rows(
            ["MATRICULA", "ADMISSÃO"],
            vec![
                vec![t("1"), t("31/02/2025")],
                vec![t("2"), t("22/04/2025")],
                vec![t("3"), CellValue::Empty],
            ],
        );
        let extraction = extract_roster(&table, &ColumnMap::default(), &Vocabulary::default());
        assert_eq!(extraction.malformed_dates, 1);
        assert_eq!(extraction.records[0].admission_date, None);
        assert_eq!(extraction.records[1].admission_date, Some(date(2025, 4, 22)));
        assert!(extraction.warnings.iter().any(|w| w.starts_with("[MALFORMED_DATE]")));
    }

    #[test]
    fn test_admission_source_overrides_roster_date() {
        let mut records = extract_roster(
            &create_test_roster(),
            &ColumnMap::default(),
            &Vocabulary::default(),
        )
        .records;
        let admissions = Table::with_rows(
            ["MATRICULA", "ADMISSÃO"],
            vec![
                vec![t("1001"), t("2025-04-28")],
                vec![t("9999"), t("2025-04-28")],
                vec![t("1002"), t("garbage")],
            ],
        );

        let malformed = attach_admissions(&mut records, &admissions, &ColumnMap::default());
        assert_eq!(malformed, 1);
        assert_eq!(records[0].admission_date, Some(date(2025, 4, 28)));
        assert_eq!(records[1].admission_date, None);
    }

    #[test]
    fn test_attach_terminations_uses_affirmative_vocabulary() {
        let mut records = extract_roster(
            &create_test_roster(),
            &ColumnMap::default(),
            &Vocabulary::default(),
        )
        .records;
        let terminations = Table::with_rows(
            ["MATRICULA", "DATA DEMISSÃO", "COMUNICADO DE DESLIGAMENTO"],
            vec![
                vec![t("1001"), t("21/05/2025"), t("ok")],
                vec![t("1002"), t("10/05/2025"), CellValue::Empty],
            ],
        );

        attach_terminations(
            &mut records,
            &terminations,
            &ColumnMap::default(),
            &Vocabulary::default(),
        );
        assert_eq!(
            records[0].termination.unwrap().effective_date(),
            Some(date(2025, 5, 21))
        );
        assert!(!records[1].termination.unwrap().communicated);
    }

    #[test]
    fn test_attach_vacations() {
        let mut records = extract_roster(
            &create_test_roster(),
            &ColumnMap::default(),
            &Vocabulary::default(),
        )
        .records;
        let vacations = Table::with_rows(
            ["MATRICULA", "DIAS DE FÉRIAS"],
            vec![vec![t("1002"), t("10")], vec![t("1001"), t("-3")]],
        );

        attach_vacations(&mut records, &vacations, &ColumnMap::default());
        assert_eq!(records[0].vacation_days, 0);
        assert_eq!(records[1].vacation_days, 10);
    }
}
