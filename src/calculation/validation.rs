//! Structural validation of the output table.
//!
//! The validator inspects the final table and the rows it was built from,
//! and reports problems as warnings. It never modifies data and never fails.

use serde::Serialize;

use crate::models::{
    BenefitComputation, COL_DAILY_RATE, COL_ELIGIBLE_DAYS, COL_EMPLOYEE_SHARE,
    COL_EMPLOYER_SHARE, COL_KEY, COL_PRORATED_DAYS, COL_TOTAL_VALUE, COL_UNIT, DaysSource,
    NULLABLE_COLUMNS, RateSource, Table,
};

use super::aggregate::round_currency;

/// Columns every output table must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = [COL_KEY, COL_ELIGIBLE_DAYS, COL_UNIT, COL_TOTAL_VALUE];

/// An ordered list of warnings; empty means the result is structurally sound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    warnings: Vec<String>,
}

impl ValidationReport {
    /// Returns true when no warning was raised.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Returns the warnings in order.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consumes the report, returning the warnings.
    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    fn push(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}

/// Validates the output table.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::calculation::validate;
/// use meal_benefit_engine::models::build_output_table;
///
/// let table = build_output_table(&[], false);
/// let report = validate(&table, &[]);
/// assert_eq!(report.warnings().len(), 1);
/// assert!(report.warnings()[0].starts_with("[EMPTY_RESULT]"));
/// ```
pub fn validate(table: &Table, rows: &[BenefitComputation]) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_required_columns(table, &mut report);
    check_bounds(table, &mut report);
    check_value_consistency(table, &mut report);
    check_residual_empties(table, &mut report);
    check_lookup_fallbacks(rows, &mut report);

    if table.is_empty() {
        report.push("[EMPTY_RESULT] No eligible employees; the output has no rows".to_string());
    }

    report
}

fn check_required_columns(table: &Table, report: &mut ValidationReport) {
    for column in REQUIRED_COLUMNS {
        if table.find_column(&[column]).is_none() {
            report.push(format!(
                "[STRUCTURE] Output is missing required column {}",
                column
            ));
        }
    }
}

fn check_bounds(table: &Table, report: &mut ValidationReport) {
    let Some(prorated_col) = table.find_column(&[COL_PRORATED_DAYS]) else {
        return;
    };
    let eligible_col = table.find_column(&[COL_ELIGIBLE_DAYS]);

    let mut negative = 0;
    let mut above = 0;
    for row in 0..table.len() {
        let Some(prorated) = table.cell(row, prorated_col).as_decimal() else {
            continue;
        };
        if prorated.is_sign_negative() && !prorated.is_zero() {
            negative += 1;
        }
        if let Some(eligible) = eligible_col.and_then(|c| table.cell(row, c).as_decimal()) {
            if prorated > eligible {
                above += 1;
            }
        }
    }

    if negative > 0 {
        report.push(format!(
            "[BOUNDS] {} employee(s) have negative {}",
            negative, COL_PRORATED_DAYS
        ));
    }
    if above > 0 {
        report.push(format!(
            "[BOUNDS] {} employee(s) have {} above {}",
            above, COL_PRORATED_DAYS, COL_ELIGIBLE_DAYS
        ));
    }
}

fn check_value_consistency(table: &Table, report: &mut ValidationReport) {
    let (Some(days_col), Some(rate_col), Some(total_col)) = (
        table.find_column(&[COL_PRORATED_DAYS]),
        table.find_column(&[COL_DAILY_RATE]),
        table.find_column(&[COL_TOTAL_VALUE]),
    ) else {
        return;
    };
    let shares = table
        .find_column(&[COL_EMPLOYER_SHARE])
        .zip(table.find_column(&[COL_EMPLOYEE_SHARE]));

    let mut mismatched = 0;
    let mut unbalanced = 0;
    for row in 0..table.len() {
        let days = table.cell(row, days_col).as_decimal();
        let rate = table.cell(row, rate_col).as_decimal();
        let total = table.cell(row, total_col).as_decimal();
        if let (Some(days), Some(rate), Some(total)) = (days, rate, total) {
            if round_currency(days * rate) != total {
                mismatched += 1;
            }
            if let Some((employer_col, employee_col)) = shares {
                let employer = table.cell(row, employer_col).as_decimal();
                let employee = table.cell(row, employee_col).as_decimal();
                if employer.zip(employee).map(|(a, b)| a + b) != Some(total) {
                    unbalanced += 1;
                }
            }
        }
    }

    if mismatched > 0 {
        report.push(format!(
            "[VALUE_MISMATCH] {} employee(s) have {} different from {} × {}",
            mismatched, COL_TOTAL_VALUE, COL_PRORATED_DAYS, COL_DAILY_RATE
        ));
    }
    if unbalanced > 0 {
        report.push(format!(
            "[VALUE_MISMATCH] {} employee(s) have shares that do not add up to {}",
            unbalanced, COL_TOTAL_VALUE
        ));
    }
}

fn check_residual_empties(table: &Table, report: &mut ValidationReport) {
    for (index, column) in table.columns().iter().enumerate() {
        if NULLABLE_COLUMNS.contains(&column.as_str()) {
            continue;
        }
        let empty = table.column_values(index).filter(|c| c.is_blank()).count();
        if empty > 0 {
            report.push(format!(
                "[NULL_VALUES] Column {} has {} empty cell(s)",
                column, empty
            ));
        }
    }
}

fn check_lookup_fallbacks(rows: &[BenefitComputation], report: &mut ValidationReport) {
    let calendar_fallbacks = rows
        .iter()
        .filter(|r| r.days_source == DaysSource::PeriodDefault)
        .count();
    if calendar_fallbacks > 0 {
        report.push(format!(
            "[UNRESOLVED_DAYS] {} employee(s) have no unit calendar entry; the period business-day count was used",
            calendar_fallbacks
        ));
    }

    let median_fallbacks = rows
        .iter()
        .filter(|r| r.rate_source == RateSource::MedianFallback)
        .count();
    if median_fallbacks > 0 {
        report.push(format!(
            "[UNRESOLVED_RATE] {} employee(s) have no rate for their region; the median rate was used",
            median_fallbacks
        ));
    }

    let unavailable = rows
        .iter()
        .filter(|r| r.rate_source == RateSource::Unavailable)
        .count();
    if unavailable > 0 {
        report.push(format!(
            "[UNRESOLVED_RATE] {} employee(s) have no usable rate table; the rate defaulted to zero",
            unavailable
        ));
    }
}
