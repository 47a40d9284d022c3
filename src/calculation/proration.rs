//! Proration of eligible days for partial-period employees.
//!
//! This module adjusts an employee's baseline eligible days when they were
//! admitted during the period or have a communicated termination. The result
//! always stays within `[0, baseline]`.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::config::{RoundingPolicy, RuleSet};
use crate::models::{BusinessCalendar, EvaluationPeriod, ProrationRule, TerminationNotice};

/// The fixed inputs shared by every proration in a run.
#[derive(Debug, Clone, Copy)]
pub struct ProrationContext<'a> {
    period: &'a EvaluationPeriod,
    calendar: &'a BusinessCalendar,
    rounding: RoundingPolicy,
    total_business_days: u32,
}

impl<'a> ProrationContext<'a> {
    /// Creates a context, counting the period's business days once.
    pub fn new(
        period: &'a EvaluationPeriod,
        calendar: &'a BusinessCalendar,
        rounding: RoundingPolicy,
    ) -> Self {
        let total_business_days = calendar.business_days_between(period.start, period.end);
        Self {
            period,
            calendar,
            rounding,
            total_business_days,
        }
    }

    /// Creates a context from a rule set.
    pub fn from_rules(rules: &'a RuleSet) -> Self {
        Self::new(rules.period(), rules.calendar(), rules.rounding())
    }

    /// Business days in the whole period.
    pub fn total_business_days(&self) -> u32 {
        self.total_business_days
    }
}

/// The result of prorating one employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProrationOutcome {
    /// The employee keeps `days` eligible days.
    Days {
        /// Prorated days, within `[0, baseline]`.
        days: u32,
        /// The branch that produced `days`.
        rule: ProrationRule,
    },
    /// A communicated termination on or before the cutoff removes the employee.
    Excluded,
}

/// Scales a baseline by `remaining / total` business days.
///
/// Returns 0 when `total` is 0 and never exceeds `baseline`.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::calculation::scale_days;
/// use meal_benefit_engine::config::RoundingPolicy;
///
/// // 20 × 21 / 30 = 14
/// assert_eq!(scale_days(20, 21, 30, RoundingPolicy::HalfEven), 14);
/// // 22 × 15 / 20 = 16.5, ties to even
/// assert_eq!(scale_days(22, 15, 20, RoundingPolicy::HalfEven), 16);
/// assert_eq!(scale_days(22, 15, 20, RoundingPolicy::HalfUp), 17);
/// ```
pub fn scale_days(baseline: u32, remaining: u32, total: u32, rounding: RoundingPolicy) -> u32 {
    if total == 0 {
        return 0;
    }
    let scaled = Decimal::from(baseline) * Decimal::from(remaining) / Decimal::from(total);
    rounding
        .apply(scaled)
        .to_u32()
        .unwrap_or(0)
        .min(baseline)
}

/// Prorates one employee's baseline eligible days.
///
/// An admission after the period yields 0 whatever else applies. A
/// communicated termination with a date comes next: on or before the cutoff
/// the employee is excluded, after it only the business days in
/// `(cutoff, termination_date]` count, starting no earlier than the
/// admission. Otherwise an admission inside the period scales the baseline
/// by the business days remaining from the admission date.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::calculation::{prorate, ProrationContext, ProrationOutcome};
/// use meal_benefit_engine::config::RoundingPolicy;
/// use meal_benefit_engine::models::{BusinessCalendar, EvaluationPeriod, ProrationRule, TerminationNotice};
/// use chrono::NaiveDate;
///
/// let period = EvaluationPeriod {
///     start: NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
///     end: NaiveDate::from_ymd_opt(2025, 5, 15).unwrap(),
///     cutoff: NaiveDate::from_ymd_opt(2025, 5, 15).unwrap(),
/// };
/// let calendar = BusinessCalendar::default();
/// let context = ProrationContext::new(&period, &calendar, RoundingPolicy::HalfEven);
///
/// let on_cutoff = TerminationNotice { communicated: true, date: Some(period.cutoff) };
/// assert_eq!(prorate(22, None, Some(&on_cutoff), &context), ProrationOutcome::Excluded);
///
/// assert_eq!(
///     prorate(22, None, None, &context),
///     ProrationOutcome::Days { days: 22, rule: ProrationRule::Baseline }
/// );
/// ```
pub fn prorate(
    baseline: u32,
    admission_date: Option<NaiveDate>,
    termination: Option<&TerminationNotice>,
    context: &ProrationContext<'_>,
) -> ProrationOutcome {
    let period = context.period;

    if admission_date.is_some_and(|admission| admission > period.end) {
        return ProrationOutcome::Days {
            days: 0,
            rule: ProrationRule::AdmittedAfterPeriod,
        };
    }

    if let Some(termination_date) = termination.and_then(TerminationNotice::effective_date) {
        if termination_date <= period.cutoff {
            return ProrationOutcome::Excluded;
        }
        // Days before the admission were never worked
        let window = period
            .cutoff
            .checked_add_days(Days::new(1))
            .map(|first| admission_date.map_or(first, |admission| first.max(admission)))
            .map(|first| {
                context
                    .calendar
                    .business_days_between(first, termination_date)
            })
            .unwrap_or(0);
        return ProrationOutcome::Days {
            days: window.min(baseline),
            rule: ProrationRule::TerminationProrated,
        };
    }

    match admission_date {
        Some(admission) if admission > period.start => {
            let remaining = context
                .calendar
                .business_days_between(admission, period.end);
            ProrationOutcome::Days {
                days: scale_days(
                    baseline,
                    remaining,
                    context.total_business_days,
                    context.rounding,
                ),
                rule: ProrationRule::AdmissionProrated,
            }
        }
        _ => ProrationOutcome::Days {
            days: baseline,
            rule: ProrationRule::Baseline,
        },
    }
}
