//! The benefit pipeline.
//!
//! [`compute_benefits`] composes every stage of [`crate::calculation`] over
//! one set of input tables and returns a [`BenefitRun`]. It performs no I/O;
//! loading and writing tables belong to [`crate::io`].

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{
    ExclusionReason, ExclusionSources, ProratedEmployee, ProrationContext, ProrationOutcome,
    RateTable, UnitCalendar, aggregate, attach_admissions, attach_terminations, attach_vacations,
    build_exclusion_set, extract_roster, filter_roster, merge_lookups, prorate, validate,
};
use crate::config::{RuleSet, TerminationHandling};
use crate::error::{EngineError, EngineResult};
use crate::models::{BenefitRun, Table, build_output_table};

/// The input tables of one run. Only the roster is mandatory.
#[derive(Debug, Clone, Default)]
pub struct SourceTables {
    /// Active employees.
    pub roster: Option<Table>,
    /// Terminations.
    pub terminations: Option<Table>,
    /// Admissions during the period.
    pub admissions: Option<Table>,
    /// Leaves, with an eligibility flag.
    pub leaves: Option<Table>,
    /// Apprentices.
    pub apprentices: Option<Table>,
    /// Interns.
    pub interns: Option<Table>,
    /// Employees working abroad.
    pub abroad: Option<Table>,
    /// Vacation days.
    pub vacations: Option<Table>,
    /// Bargaining-unit calendar.
    pub unit_calendar: Option<Table>,
    /// Per-region rates.
    pub unit_rates: Option<Table>,
}

/// Computes the benefit entitlement of every eligible employee.
///
/// Runs the stages in order: roster extraction, exclusion, role and status
/// filtering, lookups, proration, aggregation and validation. Warnings raised
/// along the way come first in the returned run, followed by the validator's.
///
/// # Errors
///
/// Returns `MissingMandatoryInput` when the roster is absent, and
/// `InvalidConfig` when the rule set is inconsistent. Nothing else aborts a
/// run.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::config::{ColumnMap, RuleMetadata, RuleSet, Vocabulary};
/// use meal_benefit_engine::engine::{compute_benefits, SourceTables};
/// use meal_benefit_engine::models::{CellValue, EvaluationPeriod, Table};
/// use chrono::NaiveDate;
///
/// let period = EvaluationPeriod {
///     start: NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
///     end: NaiveDate::from_ymd_opt(2025, 5, 15).unwrap(),
///     cutoff: NaiveDate::from_ymd_opt(2025, 5, 15).unwrap(),
/// };
/// let rules = RuleSet::new(
///     RuleMetadata { name: "VR".into(), version: "1".into(), description: None },
///     period,
///     Vocabulary::default(),
///     ColumnMap::default(),
///     Vec::new(),
/// );
/// let sources = SourceTables {
///     roster: Some(Table::with_rows(
///         ["MATRICULA", "SINDICATO"],
///         vec![vec![CellValue::text("1001"), CellValue::text("SINDPD SP")]],
///     )),
///     ..Default::default()
/// };
///
/// let run = compute_benefits(&rules, &sources)?;
/// assert_eq!(run.rows.len(), 1);
/// assert_eq!(run.rows[0].prorated_days, 23);
/// # Ok::<(), meal_benefit_engine::error::EngineError>(())
/// ```
pub fn compute_benefits(rules: &RuleSet, sources: &SourceTables) -> EngineResult<BenefitRun> {
    let roster = sources
        .roster
        .as_ref()
        .ok_or_else(|| EngineError::MissingMandatoryInput {
            table: "roster".to_string(),
        })?;
    rules.validate()?;

    let run_id = Uuid::new_v4();
    let columns = rules.columns();
    let vocabulary = rules.vocabulary();
    info!(
        run_id = %run_id,
        rule_set = %rules.metadata().name,
        version = %rules.metadata().version,
        roster_rows = roster.len(),
        "Starting benefit run"
    );

    // Roster and per-employee facts
    let extraction = extract_roster(roster, columns, vocabulary);
    let mut warnings = extraction.warnings;
    let mut records = extraction.records;

    if let Some(admissions) = &sources.admissions {
        let malformed = attach_admissions(&mut records, admissions, columns);
        if malformed > 0 {
            warnings.push(format!(
                "[MALFORMED_DATE] {} admission date cell(s) could not be parsed and were treated as absent",
                malformed
            ));
        }
    }
    if let Some(vacations) = &sources.vacations {
        attach_vacations(&mut records, vacations, columns);
    }
    if rules.termination_handling() == TerminationHandling::Prorate {
        if let Some(terminations) = &sources.terminations {
            let malformed = attach_terminations(&mut records, terminations, columns, vocabulary);
            if malformed > 0 {
                warnings.push(format!(
                    "[MALFORMED_DATE] {} termination date cell(s) could not be parsed and were treated as absent",
                    malformed
                ));
            }
        }
    }

    // Exclusions
    let exclusion_sources = ExclusionSources {
        terminations: sources.terminations.as_ref(),
        apprentices: sources.apprentices.as_ref(),
        interns: sources.interns.as_ref(),
        abroad: sources.abroad.as_ref(),
        leaves: sources.leaves.as_ref(),
    };
    let exclusions = build_exclusion_set(
        &exclusion_sources,
        columns,
        vocabulary,
        rules.termination_handling(),
    );
    for (reason, count) in exclusions.contributions() {
        debug!(run_id = %run_id, reason = %reason, count, "Exclusion source");
    }
    let before = records.len();
    records.retain(|r| !exclusions.contains(&r.key));
    info!(
        run_id = %run_id,
        excluded_keys = exclusions.len(),
        removed = before - records.len(),
        "Applied exclusion set"
    );

    // Role and status
    let filtered = filter_roster(
        records,
        vocabulary,
        extraction.has_role_column,
        extraction.has_status_column,
    );
    for warning in &filtered.warnings {
        warn!(run_id = %run_id, "{}", warning);
    }
    warnings.extend(filtered.warnings);

    // Lookups
    let calendar = sources
        .unit_calendar
        .as_ref()
        .map(|t| UnitCalendar::from_table(t, &columns.unit_calendar));
    let rates = sources
        .unit_rates
        .as_ref()
        .map(|t| RateTable::from_table(t, &columns.unit_rates, &vocabulary.regions));
    if rates.as_ref().is_some_and(|r| r.median().is_none()) {
        warn!(run_id = %run_id, "Rate table has no usable rates");
    }
    let context = ProrationContext::from_rules(rules);
    let merged = merge_lookups(
        filtered.kept,
        calendar.as_ref(),
        rates.as_ref(),
        &vocabulary.regions,
        context.total_business_days(),
    );

    // Proration
    let mut late_exclusions = Vec::new();
    let mut prorated = Vec::with_capacity(merged.len());
    for employee in merged {
        match prorate(
            employee.eligible_days,
            employee.record.admission_date,
            employee.record.termination.as_ref(),
            &context,
        ) {
            ProrationOutcome::Days { days, rule } => prorated.push(ProratedEmployee {
                merged: employee,
                prorated_days: days,
                rule,
            }),
            ProrationOutcome::Excluded => late_exclusions.push(employee.record.key),
        }
    }
    let exclusions = exclusions.extended(ExclusionReason::TerminatedBeforeCutoff, late_exclusions);
    debug!(
        run_id = %run_id,
        excluded_keys = exclusions.len(),
        prorated = prorated.len(),
        "Prorated eligible days"
    );

    // Aggregation and validation
    let rows = aggregate(prorated, rules.cost_split());
    let table = build_output_table(&rows, rules.cost_split().is_some());
    let report = validate(&table, &rows);
    for warning in report.warnings() {
        warn!(run_id = %run_id, "{}", warning);
    }
    warnings.extend(report.into_warnings());

    let run = BenefitRun {
        run_id,
        generated_at: Utc::now(),
        rule_set: rules.metadata().name.clone(),
        rule_version: rules.metadata().version.clone(),
        rows,
        table,
        warnings,
    };
    info!(
        run_id = %run_id,
        rows = run.rows.len(),
        total = %run.total_value(),
        warnings = run.warnings.len(),
        "Benefit run complete"
    );

    Ok(run)
}
