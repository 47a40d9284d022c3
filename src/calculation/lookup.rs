//! Lookup merge: eligible days and per-day rates.
//!
//! This module attaches to every roster record the baseline eligible days of
//! its bargaining unit and the per-day rate of its region. Both joins are
//! left joins: unmatched records receive a fallback, never a gap.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::config::{RegionVocabulary, UnitCalendarColumns, UnitRateColumns};
use crate::models::{DaysSource, EmployeeRecord, RateSource, Table, fold_label};

use super::region::{RegionMatcher, canonical_region};

/// Bargaining-unit name to baseline eligible business days.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::calculation::UnitCalendar;
/// use meal_benefit_engine::config::UnitCalendarColumns;
/// use meal_benefit_engine::models::{CellValue, Table};
///
/// let table = Table::with_rows(
///     ["SINDICATO", "DIAS UTEIS"],
///     vec![vec![CellValue::text("SINDPD SP"), CellValue::from(22u32)]],
/// );
/// let calendar = UnitCalendar::from_table(&table, &UnitCalendarColumns::default());
///
/// assert_eq!(calendar.days_for(" sindpd  sp "), Some(22));
/// assert_eq!(calendar.days_for("SINDPD RJ"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitCalendar {
    days: HashMap<String, u32>,
    skipped_rows: usize,
}

impl UnitCalendar {
    /// Builds the calendar from a table.
    ///
    /// Columns are found by alias; a sheet where neither is found is read
    /// positionally (first column unit, second column days). Rows with a
    /// blank unit or a non-numeric day count are skipped; when a unit repeats
    /// the first row wins.
    pub fn from_table(table: &Table, aliases: &UnitCalendarColumns) -> Self {
        let mut calendar = UnitCalendar::default();

        let columns = match (
            table.find_column(&aliases.unit),
            table.find_column(&aliases.days),
        ) {
            (Some(unit), Some(days)) => Some((unit, days)),
            (None, None) if table.width() >= 2 => Some((0, 1)),
            _ => None,
        };
        let Some((unit_col, days_col)) = columns else {
            calendar.skipped_rows = table.len();
            return calendar;
        };

        for row in 0..table.len() {
            let unit = table.cell(row, unit_col).as_text().map(|u| fold_label(&u));
            let days = table
                .cell(row, days_col)
                .as_decimal()
                .filter(|d| !d.is_sign_negative())
                .and_then(|d| d.trunc().to_u32());
            match (unit, days) {
                (Some(unit), Some(days)) => {
                    calendar.days.entry(unit).or_insert(days);
                }
                _ => calendar.skipped_rows += 1,
            }
        }

        calendar
    }

    /// Returns the eligible days of a unit, matching on the folded name.
    pub fn days_for(&self, unit_name: &str) -> Option<u32> {
        self.days.get(&fold_label(unit_name)).copied()
    }

    /// Returns the number of units on the calendar.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Returns true when the calendar has no units.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Returns the number of rows skipped while reading.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

/// Region code to per-day rate, with the median of all rates as fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    rates: BTreeMap<String, Decimal>,
    median: Option<Decimal>,
    skipped_rows: usize,
}

impl RateTable {
    /// Builds the rate table.
    ///
    /// Region labels may be codes or region names. Every parseable rate
    /// takes part in the median, even when its region is unknown.
    pub fn from_table(table: &Table, aliases: &UnitRateColumns, regions: &RegionVocabulary) -> Self {
        let mut rate_table = RateTable::default();
        let (Some(region_col), Some(rate_col)) = (
            table.find_column(&aliases.region),
            table.find_column(&aliases.rate),
        ) else {
            rate_table.skipped_rows = table.len();
            return rate_table;
        };

        let mut all_rates = Vec::new();
        for row in 0..table.len() {
            let Some(rate) = table
                .cell(row, rate_col)
                .as_decimal()
                .filter(|r| !r.is_sign_negative())
            else {
                rate_table.skipped_rows += 1;
                continue;
            };
            all_rates.push(rate);
            if let Some(region) = table
                .cell(row, region_col)
                .as_text()
                .and_then(|label| canonical_region(&label, regions))
            {
                rate_table.rates.entry(region).or_insert(rate);
            }
        }

        rate_table.median = median(&mut all_rates);
        rate_table
    }

    /// Returns the rate of a region, if present.
    pub fn rate_for(&self, region: &str) -> Option<Decimal> {
        self.rates.get(region).copied()
    }

    /// Returns the median of all rates, if any were read.
    pub fn median(&self) -> Option<Decimal> {
        self.median
    }

    /// Returns the number of rows skipped while reading.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Resolves the rate of an optional region, falling back to the median.
    ///
    /// # Example
    ///
    /// ```
    /// use meal_benefit_engine::calculation::RateTable;
    /// use meal_benefit_engine::config::{RegionVocabulary, UnitRateColumns};
    /// use meal_benefit_engine::models::{CellValue, RateSource, Table};
    /// use rust_decimal::Decimal;
    ///
    /// let table = Table::with_rows(
    ///     ["ESTADO", "VALOR"],
    ///     vec![
    ///         vec![CellValue::text("SP"), CellValue::text("30,00")],
    ///         vec![CellValue::text("RJ"), CellValue::text("32,00")],
    ///     ],
    /// );
    /// let rates = RateTable::from_table(&table, &UnitRateColumns::default(), &RegionVocabulary::default());
    ///
    /// assert_eq!(rates.resolve(Some("SP")), (Decimal::new(3000, 2), RateSource::Region));
    /// assert_eq!(rates.resolve(None), (Decimal::new(31, 0), RateSource::MedianFallback));
    /// ```
    pub fn resolve(&self, region: Option<&str>) -> (Decimal, RateSource) {
        if let Some(rate) = region.and_then(|r| self.rate_for(r)) {
            return (rate, RateSource::Region);
        }
        match self.median {
            Some(median) => (median, RateSource::MedianFallback),
            None => (Decimal::ZERO, RateSource::Unavailable),
        }
    }
}

/// Median of a list; the mean of the two middle values for even lengths.
fn median(values: &mut [Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    values.sort();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / Decimal::TWO)
    }
}

/// A roster record with its looked-up days and rate attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedEmployee {
    /// The roster record.
    pub record: EmployeeRecord,
    /// Region inferred from the unit name.
    pub region: Option<String>,
    /// Baseline eligible days.
    pub eligible_days: u32,
    /// Where the baseline came from.
    pub days_source: DaysSource,
    /// Per-day rate.
    pub daily_rate: Decimal,
    /// Where the rate came from.
    pub rate_source: RateSource,
}

/// Attaches eligible days and rates to every record.
///
/// Records whose unit is not on the calendar (or every record, when the
/// calendar is absent) receive `period_business_days`. Records whose region
/// is unknown or has no rate receive the median rate, or zero when there is
/// no usable rate table.
pub fn merge_lookups(
    records: Vec<EmployeeRecord>,
    calendar: Option<&UnitCalendar>,
    rates: Option<&RateTable>,
    regions: &RegionVocabulary,
    period_business_days: u32,
) -> Vec<MergedEmployee> {
    let matcher = RegionMatcher::new(regions);
    let merged: Vec<MergedEmployee> = records
        .into_iter()
        .map(|record| {
            let unit = record.unit_name.as_deref();

            let (eligible_days, days_source) = match unit
                .zip(calendar)
                .and_then(|(u, cal)| cal.days_for(u))
            {
                Some(days) => (days, DaysSource::UnitCalendar),
                None => (period_business_days, DaysSource::PeriodDefault),
            };

            let region = unit.and_then(|u| matcher.infer(u));
            let (daily_rate, rate_source) = match rates {
                Some(table) => table.resolve(region.as_deref()),
                None => (Decimal::ZERO, RateSource::Unavailable),
            };

            MergedEmployee {
                record,
                region,
                eligible_days,
                days_source,
                daily_rate,
                rate_source,
            }
        })
        .collect();

    debug!(
        employees = merged.len(),
        calendar_fallbacks = merged
            .iter()
            .filter(|m| m.days_source == DaysSource::PeriodDefault)
            .count(),
        rate_fallbacks = merged.iter().filter(|m| m.rate_source.is_fallback()).count(),
        "Merged unit calendar and rates"
    );

    merged
}
