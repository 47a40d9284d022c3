//! Benefit value aggregation.
//!
//! This module turns prorated days and rates into monetary values, applies
//! the optional employer/employee split, and orders the output rows.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::CostSplit;
use crate::models::{BenefitComputation, CostShare, ProrationRule};

use super::lookup::MergedEmployee;

/// A merged employee after proration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProratedEmployee {
    /// The employee with looked-up days and rate.
    pub merged: MergedEmployee,
    /// Days to purchase.
    pub prorated_days: u32,
    /// The proration branch applied.
    pub rule: ProrationRule,
}

/// Rounds a monetary amount to cents, ties away from zero.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes `days × rate`, rounded to cents.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::calculation::benefit_value;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let value = benefit_value(22, Decimal::from_str("37.50").unwrap());
/// assert_eq!(value, Decimal::from_str("825.00").unwrap());
/// ```
pub fn benefit_value(days: u32, rate: Decimal) -> Decimal {
    round_currency(Decimal::from(days) * rate)
}

/// Splits a total between employer and employee.
///
/// The employer share is rounded to cents; the employee share is the
/// remainder, so the two always add up to `total`.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::calculation::split_value;
/// use meal_benefit_engine::config::CostSplit;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let split = CostSplit {
///     employer_percent: Decimal::from(80),
///     employee_percent: Decimal::from(20),
/// };
/// let share = split_value(Decimal::from_str("825.00").unwrap(), &split);
/// assert_eq!(share.employer, Decimal::from_str("660.00").unwrap());
/// assert_eq!(share.employee, Decimal::from_str("165.00").unwrap());
/// ```
pub fn split_value(total: Decimal, split: &CostSplit) -> CostShare {
    let employer = round_currency(total * split.employer_percent / Decimal::ONE_HUNDRED);
    CostShare {
        employer,
        employee: total - employer,
    }
}

/// Builds the output rows, sorted by company, unit and key.
///
/// Rows without a company or unit sort after those with one.
pub fn aggregate(
    employees: Vec<ProratedEmployee>,
    cost_split: Option<&CostSplit>,
) -> Vec<BenefitComputation> {
    let mut rows: Vec<BenefitComputation> = employees
        .into_iter()
        .map(|employee| {
            let ProratedEmployee {
                merged,
                prorated_days,
                rule,
            } = employee;
            let record = merged.record;
            let total_value = benefit_value(prorated_days, merged.daily_rate);

            BenefitComputation {
                key: record.key,
                name: record.name,
                company: record.company,
                role_title: record.role_title,
                unit_name: record.unit_name,
                region: merged.region,
                eligible_days: merged.eligible_days,
                days_source: merged.days_source,
                admission_date: record.admission_date,
                prorated_days,
                proration_rule: rule,
                daily_rate: merged.daily_rate,
                rate_source: merged.rate_source,
                total_value,
                cost_share: cost_split.map(|split| split_value(total_value, split)),
                vacation_days: record.vacation_days,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        (a.company.is_none(), &a.company, a.unit_name.is_none(), &a.unit_name, &a.key).cmp(&(
            b.company.is_none(),
            &b.company,
            b.unit_name.is_none(),
            &b.unit_name,
            &b.key,
        ))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::normalize_key_text;
    use crate::models::{DaysSource, EmployeeRecord, RateSource};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn employee(key: &str, company: Option<&str>, unit: Option<&str>, days: u32) -> ProratedEmployee {
        let mut record = EmployeeRecord::new(normalize_key_text(key).unwrap());
        record.company = company.map(String::from);
        record.unit_name = unit.map(String::from);
        ProratedEmployee {
            merged: MergedEmployee {
                record,
                region: Some("SP".to_string()),
                eligible_days: 22,
                days_source: DaysSource::UnitCalendar,
                daily_rate: dec("37.50"),
                rate_source: RateSource::Region,
            },
            prorated_days: days,
            rule: ProrationRule::Baseline,
        }
    }

    #[test]
    fn test_value_is_days_times_rate() {
        assert_eq!(benefit_value(22, dec("37.50")), dec("825.00"));
        assert_eq!(benefit_value(0, dec("37.50")), Decimal::ZERO);
    }

    #[test]
    fn test_value_rounds_to_cents_away_from_zero() {
        assert_eq!(benefit_value(1, dec("10.005")), dec("10.01"));
        assert_eq!(benefit_value(3, dec("0.335")), dec("1.01"));
    }

    #[test]
    fn test_split_shares_sum_to_total() {
        let split = CostSplit {
            employer_percent: dec("80"),
            employee_percent: dec("20"),
        };
        let share = split_value(dec("100.01"), &split);
        assert_eq!(share.employer, dec("80.01"));
        assert_eq!(share.employee, dec("20.00"));
        assert_eq!(share.employer + share.employee, dec("100.01"));
    }

    #[test]
    fn test_aggregate_without_split_has_no_shares() {
        let rows = aggregate(vec![employee("1", Some("ACME"), Some("SINDPD SP"), 22)], None);
        assert_eq!(rows[0].total_value, dec("825.00"));
        assert!(rows[0].cost_share.is_none());
    }

    #[test]
    fn test_aggregate_sorts_by_company_unit_key() {
        let rows = aggregate(
            vec![
                employee("3", Some("BETA"), Some("SINDPD SP"), 1),
                employee("2", Some("ACME"), Some("SINDPD SP"), 1),
                employee("1", Some("ACME"), Some("SINDPD SP"), 1),
                employee("4", Some("ACME"), Some("SINDPD RJ"), 1),
                employee("5", None, Some("SINDPD RJ"), 1),
            ],
            None,
        );
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["4", "1", "2", "3", "5"]);
    }
}
