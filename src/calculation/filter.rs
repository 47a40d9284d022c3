//! Role and status filtering.
//!
//! This module removes roster rows whose role is in an excluded
//! classification or whose employment status is not active.

use tracing::debug;

use crate::config::Vocabulary;
use crate::models::{EmployeeKey, EmployeeRecord};

/// Why a roster row was dropped by the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterRejection {
    /// The role title contains a keyword of an excluded classification.
    Role {
        /// The matched classification (e.g., "director").
        classification: String,
    },
    /// The status does not contain the active token.
    Status {
        /// The status as read.
        status: String,
    },
}

/// The rows kept by the filter and the rows it dropped.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Rows that passed both checks, in input order.
    pub kept: Vec<EmployeeRecord>,
    /// Dropped rows with the reason.
    pub rejected: Vec<(EmployeeKey, FilterRejection)>,
    /// Warnings for checks skipped because the roster lacks the column.
    pub warnings: Vec<String>,
}

/// Filters the roster by role and status.
///
/// When the roster has no role (or status) column the check on that
/// dimension is skipped and a warning is emitted. A row with an empty cell
/// also passes on that dimension.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::calculation::{filter_roster, normalize_key_text};
/// use meal_benefit_engine::config::Vocabulary;
/// use meal_benefit_engine::models::EmployeeRecord;
///
/// let mut director = EmployeeRecord::new(normalize_key_text("1").unwrap());
/// director.role_title = Some("Diretor de Operações".to_string());
/// director.status = Some("Trabalhando".to_string());
///
/// let outcome = filter_roster(vec![director], &Vocabulary::default(), true, true);
/// assert!(outcome.kept.is_empty());
/// assert_eq!(outcome.rejected.len(), 1);
/// ```
pub fn filter_roster(
    records: Vec<EmployeeRecord>,
    vocabulary: &Vocabulary,
    has_role_column: bool,
    has_status_column: bool,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    if !has_role_column {
        outcome.warnings.push(
            "[FAIL_OPEN] Roster has no role title column; role filter was not applied".to_string(),
        );
    }
    if !has_status_column {
        outcome.warnings.push(
            "[FAIL_OPEN] Roster has no status column; status filter was not applied".to_string(),
        );
    }

    for record in records {
        match rejection(&record, vocabulary) {
            Some(reason) => outcome.rejected.push((record.key, reason)),
            None => outcome.kept.push(record),
        }
    }

    debug!(
        kept = outcome.kept.len(),
        rejected = outcome.rejected.len(),
        "Applied role and status filter"
    );

    outcome
}

fn rejection(record: &EmployeeRecord, vocabulary: &Vocabulary) -> Option<FilterRejection> {
    if let Some(classification) = record
        .role_title
        .as_deref()
        .and_then(|title| vocabulary.excluded_role(title))
    {
        return Some(FilterRejection::Role {
            classification: classification.to_string(),
        });
    }

    match record.status.as_deref() {
        Some(status) if !vocabulary.is_active_status(status) => Some(FilterRejection::Status {
            status: status.to_string(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::normalize_key_text;

    fn record(key: &str, role: Option<&str>, status: Option<&str>) -> EmployeeRecord {
        let mut r = EmployeeRecord::new(normalize_key_text(key).unwrap());
        r.role_title = role.map(String::from);
        r.status = status.map(String::from);
        r
    }

    #[test]
    fn test_active_non_excluded_role_is_kept() {
        let outcome = filter_roster(
            vec![record("1", Some("Analista"), Some("Trabalhando"))],
            &Vocabulary::default(),
            true,
            true,
        );
        assert_eq!(outcome.kept.len(), 1);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_excluded_roles_are_dropped_case_insensitively() {
        let outcome = filter_roster(
            vec![
                record("1", Some("diretor financeiro"), Some("Trabalhando")),
                record("2", Some("ESTAGIÁRIO"), Some("Trabalhando")),
                record("3", Some("Menor Aprendiz"), Some("Trabalhando")),
            ],
            &Vocabulary::default(),
            true,
            true,
        );
        assert!(outcome.kept.is_empty());
        assert_eq!(
            outcome.rejected[1].1,
            FilterRejection::Role {
                classification: "intern".to_string()
            }
        );
    }

    #[test]
    fn test_inactive_status_is_dropped() {
        let outcome = filter_roster(
            vec![record("1", Some("Analista"), Some("Férias"))],
            &Vocabulary::default(),
            true,
            true,
        );
        assert!(outcome.kept.is_empty());
        assert!(matches!(
            outcome.rejected[0].1,
            FilterRejection::Status { .. }
        ));
    }

    #[test]
    fn test_empty_cells_pass() {
        let outcome = filter_roster(
            vec![record("1", None, None)],
            &Vocabulary::default(),
            true,
            true,
        );
        assert_eq!(outcome.kept.len(), 1);
    }

    #[test]
    fn test_missing_columns_fail_open_with_warning() {
        let outcome = filter_roster(
            vec![record("1", None, None)],
            &Vocabulary::default(),
            false,
            false,
        );
        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome.warnings.iter().all(|w| w.starts_with("[FAIL_OPEN]")));
    }

    #[test]
    fn test_custom_vocabulary() {
        let mut vocabulary = Vocabulary::default();
        vocabulary
            .role_keywords
            .insert("CONSELHEIRO".to_string(), "board".to_string());
        vocabulary.excluded_role_classes.push("board".to_string());
        vocabulary.active_status = "ATIVO".to_string();

        let outcome = filter_roster(
            vec![
                record("1", Some("Conselheiro"), Some("Ativo")),
                record("2", Some("Analista"), Some("ativo")),
            ],
            &vocabulary,
            true,
            true,
        );
        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.kept[0].key.as_str(), "2");
    }
}
