//! Benefit computation results.
//!
//! This module contains the per-employee [`BenefitComputation`] rows, the
//! provenance tags recording which rule or fallback produced each value, and
//! the [`BenefitRun`] returned for a whole invocation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CellValue, EmployeeKey, Table};

/// Output column holding the employee key.
pub const COL_KEY: &str = "KEY";
/// Output column holding the employing company.
pub const COL_COMPANY: &str = "COMPANY";
/// Output column holding the role title.
pub const COL_ROLE_TITLE: &str = "ROLE_TITLE";
/// Output column holding the bargaining-unit name.
pub const COL_UNIT: &str = "UNIT";
/// Output column holding the inferred region code.
pub const COL_REGION: &str = "REGION";
/// Output column holding the baseline eligible days.
pub const COL_ELIGIBLE_DAYS: &str = "ELIGIBLE_DAYS";
/// Output column holding the admission date.
pub const COL_ADMISSION_DATE: &str = "ADMISSION_DATE";
/// Output column holding the prorated days.
pub const COL_PRORATED_DAYS: &str = "PRORATED_DAYS";
/// Output column holding the resolved per-day rate.
pub const COL_DAILY_RATE: &str = "DAILY_RATE";
/// Output column holding the total benefit value.
pub const COL_TOTAL_VALUE: &str = "TOTAL_VALUE";
/// Output column holding the employer's share.
pub const COL_EMPLOYER_SHARE: &str = "EMPLOYER_SHARE";
/// Output column holding the employee's share.
pub const COL_EMPLOYEE_SHARE: &str = "EMPLOYEE_SHARE";
/// Output column holding the informational vacation days.
pub const COL_VACATION_DAYS: &str = "VACATION_DAYS";

/// Output columns allowed to stay empty after sanitation.
pub const NULLABLE_COLUMNS: [&str; 2] = [COL_ADMISSION_DATE, COL_REGION];

/// Which proration branch produced an employee's day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProrationRule {
    /// No admission or qualifying termination; baseline kept.
    Baseline,
    /// Admitted after the period ended; nothing to purchase.
    AdmittedAfterPeriod,
    /// Scaled by the business days remaining after admission.
    AdmissionProrated,
    /// Limited to the business days between the cutoff and the termination.
    TerminationProrated,
}

/// Where an employee's baseline eligible days came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaysSource {
    /// Matched the employee's unit in the unit calendar.
    UnitCalendar,
    /// No calendar match; the period's business-day count was used.
    PeriodDefault,
}

/// Where an employee's per-day rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// The inferred region has a rate in the rate table.
    Region,
    /// No region or no rate for it; the median of known rates was used.
    MedianFallback,
    /// No usable rate table; the rate defaulted to zero.
    Unavailable,
}

impl RateSource {
    /// Returns true when the rate did not come from a direct region match.
    pub fn is_fallback(self) -> bool {
        !matches!(self, RateSource::Region)
    }
}

/// Employer/employee split of a benefit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostShare {
    /// Portion paid by the employer.
    pub employer: Decimal,
    /// Portion deducted from the employee.
    pub employee: Decimal,
}

/// One output row: the benefit entitlement of an eligible employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitComputation {
    /// Canonical employee key.
    pub key: EmployeeKey,
    /// Employee name, when the roster carries it.
    pub name: Option<String>,
    /// Employing company.
    pub company: Option<String>,
    /// Role title.
    pub role_title: Option<String>,
    /// Bargaining-unit name.
    pub unit_name: Option<String>,
    /// Region code inferred from the unit name.
    pub region: Option<String>,
    /// Baseline eligible business days before proration.
    pub eligible_days: u32,
    /// Where `eligible_days` came from.
    pub days_source: DaysSource,
    /// Admission date used by proration.
    pub admission_date: Option<NaiveDate>,
    /// Days to purchase after proration; never above `eligible_days`.
    pub prorated_days: u32,
    /// The proration branch that produced `prorated_days`.
    pub proration_rule: ProrationRule,
    /// Per-day rate.
    pub daily_rate: Decimal,
    /// Where `daily_rate` came from.
    pub rate_source: RateSource,
    /// `prorated_days × daily_rate`, rounded to cents.
    pub total_value: Decimal,
    /// Optional employer/employee split of `total_value`.
    pub cost_share: Option<CostShare>,
    /// Vacation days in the period (informational, not subtracted).
    pub vacation_days: u32,
}

/// Builds the output table from computed rows.
///
/// Rows are written in the order given; the split columns are present only
/// when `with_cost_share` is set. Absent optional values become empty cells,
/// which the validator accepts only in [`NULLABLE_COLUMNS`].
///
/// # Example
///
/// ```
/// use meal_benefit_engine::models::{build_output_table, COL_KEY, COL_TOTAL_VALUE};
///
/// let table = build_output_table(&[], false);
/// assert_eq!(table.columns().first().map(String::as_str), Some(COL_KEY));
/// assert!(table.find_column(&[COL_TOTAL_VALUE]).is_some());
/// assert!(table.is_empty());
/// ```
pub fn build_output_table(rows: &[BenefitComputation], with_cost_share: bool) -> Table {
    let mut columns = vec![
        COL_KEY,
        COL_COMPANY,
        COL_ROLE_TITLE,
        COL_UNIT,
        COL_REGION,
        COL_ELIGIBLE_DAYS,
        COL_ADMISSION_DATE,
        COL_PRORATED_DAYS,
        COL_DAILY_RATE,
        COL_TOTAL_VALUE,
    ];
    if with_cost_share {
        columns.extend([COL_EMPLOYER_SHARE, COL_EMPLOYEE_SHARE]);
    }
    columns.push(COL_VACATION_DAYS);

    let mut table = Table::new(columns);
    for row in rows {
        let mut cells = vec![
            CellValue::text(row.key.as_str()),
            CellValue::from(row.company.as_deref()),
            CellValue::from(row.role_title.as_deref()),
            CellValue::from(row.unit_name.as_deref()),
            CellValue::from(row.region.as_deref()),
            CellValue::from(row.eligible_days),
            CellValue::from(row.admission_date),
            CellValue::from(row.prorated_days),
            CellValue::from(row.daily_rate),
            CellValue::from(row.total_value),
        ];
        if with_cost_share {
            let share = row.cost_share.unwrap_or(CostShare {
                employer: Decimal::ZERO,
                employee: Decimal::ZERO,
            });
            cells.push(CellValue::from(share.employer));
            cells.push(CellValue::from(share.employee));
        }
        cells.push(CellValue::from(row.vacation_days));
        table.push_row(cells);
    }
    table
}

/// The complete result of one engine invocation.
#[derive(Debug, Clone, Serialize)]
pub struct BenefitRun {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    /// Name of the rule set applied.
    pub rule_set: String,
    /// Version of the rule set applied.
    pub rule_version: String,
    /// Computed rows, sorted by company, unit and key.
    pub rows: Vec<BenefitComputation>,
    /// The sanitized output table handed to the table writer.
    pub table: Table,
    /// Warnings from the pipeline and the validator, in order.
    pub warnings: Vec<String>,
}

impl BenefitRun {
    /// Returns the grand total of all benefit values.
    pub fn total_value(&self) -> Decimal {
        self.rows.iter().map(|r| r.total_value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::normalize_key_text;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_row() -> BenefitComputation {
        BenefitComputation {
            key: normalize_key_text("1001").unwrap(),
            name: Some("Ana".to_string()),
            company: Some("ACME".to_string()),
            role_title: Some("ANALISTA".to_string()),
            unit_name: Some("SINDPD SP".to_string()),
            region: Some("SP".to_string()),
            eligible_days: 22,
            days_source: DaysSource::UnitCalendar,
            admission_date: None,
            prorated_days: 22,
            proration_rule: ProrationRule::Baseline,
            daily_rate: dec("37.50"),
            rate_source: RateSource::Region,
            total_value: dec("825.00"),
            cost_share: None,
            vacation_days: 0,
        }
    }

    #[test]
    fn test_output_table_without_split_has_eleven_columns() {
        let table = build_output_table(&[sample_row()], false);
        assert_eq!(table.width(), 11);
        assert!(table.find_column(&[COL_EMPLOYER_SHARE]).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_output_table_with_split_adds_share_columns() {
        let mut row = sample_row();
        row.cost_share = Some(CostShare {
            employer: dec("660.00"),
            employee: dec("165.00"),
        });
        let table = build_output_table(&[row], true);
        let employer = table.find_column(&[COL_EMPLOYER_SHARE]).unwrap();
        assert_eq!(table.cell(0, employer), &CellValue::Number(dec("660.00")));
    }

    #[test]
    fn test_absent_admission_date_is_empty_cell() {
        let table = build_output_table(&[sample_row()], false);
        let col = table.find_column(&[COL_ADMISSION_DATE]).unwrap();
        assert_eq!(table.cell(0, col), &CellValue::Empty);
    }

    #[test]
    fn test_rate_source_fallback_flag() {
        assert!(!RateSource::Region.is_fallback());
        assert!(RateSource::MedianFallback.is_fallback());
        assert!(RateSource::Unavailable.is_fallback());
    }

    #[test]
    fn test_proration_rule_serialization() {
        let json = serde_json::to_string(&ProrationRule::AdmissionProrated).unwrap();
        assert_eq!(json, "\"admission_prorated\"");
    }
}
