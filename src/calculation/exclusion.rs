//! Exclusion set construction.
//!
//! This module builds the set of employee keys that must not receive the
//! benefit, from the termination, apprentice, intern, abroad and leave
//! sources.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::config::{ColumnMap, KeyColumns, TerminationHandling, Vocabulary};
use crate::models::{EmployeeKey, Table};

use super::normalize::{key_set, normalize_key};

/// Which source put a key in the exclusion set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Listed in the termination source.
    Terminated,
    /// Listed in the apprentice source.
    Apprentice,
    /// Listed in the intern source.
    Intern,
    /// Listed in the abroad source.
    Abroad,
    /// On leave and flagged as not eligible for purchase.
    Leave,
    /// Communicated termination on or before the cutoff.
    TerminatedBeforeCutoff,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExclusionReason::Terminated => "terminated",
            ExclusionReason::Apprentice => "apprentice",
            ExclusionReason::Intern => "intern",
            ExclusionReason::Abroad => "abroad",
            ExclusionReason::Leave => "leave",
            ExclusionReason::TerminatedBeforeCutoff => "terminated_before_cutoff",
        };
        f.write_str(label)
    }
}

/// The optional sources an exclusion set is built from.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExclusionSources<'a> {
    /// Terminations.
    pub terminations: Option<&'a Table>,
    /// Apprentices.
    pub apprentices: Option<&'a Table>,
    /// Interns.
    pub interns: Option<&'a Table>,
    /// Employees working abroad.
    pub abroad: Option<&'a Table>,
    /// Leaves, with an eligibility flag.
    pub leaves: Option<&'a Table>,
}

/// An immutable set of employee keys that receive no benefit.
///
/// Membership is a plain set; the per-source counts only feed logging.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::calculation::{build_exclusion_set, normalize_key_text, ExclusionSources};
/// use meal_benefit_engine::config::{ColumnMap, TerminationHandling, Vocabulary};
/// use meal_benefit_engine::models::{CellValue, Table};
///
/// let interns = Table::with_rows(["MATRICULA"], vec![vec![CellValue::text("1001.0")]]);
/// let sources = ExclusionSources { interns: Some(&interns), ..Default::default() };
///
/// let set = build_exclusion_set(
///     &sources,
///     &ColumnMap::default(),
///     &Vocabulary::default(),
///     TerminationHandling::Exclude,
/// );
/// assert!(set.contains(&normalize_key_text("1001").unwrap()));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    keys: BTreeSet<EmployeeKey>,
    contributions: BTreeMap<ExclusionReason, usize>,
}

impl ExclusionSet {
    /// Checks whether a key is excluded.
    pub fn contains(&self, key: &EmployeeKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns the number of excluded keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true when nobody is excluded.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates over the excluded keys in order.
    pub fn iter(&self) -> impl Iterator<Item = &EmployeeKey> {
        self.keys.iter()
    }

    /// Returns how many keys each source contributed (before de-duplication).
    pub fn contributions(&self) -> &BTreeMap<ExclusionReason, usize> {
        &self.contributions
    }

    /// Returns a new set that also holds the given keys.
    pub fn extended<I>(&self, reason: ExclusionReason, keys: I) -> ExclusionSet
    where
        I: IntoIterator<Item = EmployeeKey>,
    {
        let mut extended = self.clone();
        extended.add(reason, keys);
        extended
    }

    fn add<I>(&mut self, reason: ExclusionReason, keys: I)
    where
        I: IntoIterator<Item = EmployeeKey>,
    {
        let mut added = 0;
        for key in keys {
            self.keys.insert(key);
            added += 1;
        }
        if added > 0 {
            *self.contributions.entry(reason).or_insert(0) += added;
        }
    }
}

fn listed_keys(table: Option<&Table>, aliases: &KeyColumns) -> BTreeSet<EmployeeKey> {
    table
        .and_then(|t| t.find_column(&aliases.key).map(|col| key_set(t, col)))
        .unwrap_or_default()
}

/// Builds the exclusion set from every disqualifying source.
///
/// Keys in the apprentice, intern and abroad sources are always excluded,
/// as are termination-source keys under [`TerminationHandling::Exclude`].
/// Leave keys are excluded only when their eligibility flag is in the
/// "not eligible" vocabulary. Missing tables, missing key columns and absent
/// keys contribute nothing.
pub fn build_exclusion_set(
    sources: &ExclusionSources<'_>,
    columns: &ColumnMap,
    vocabulary: &Vocabulary,
    termination_handling: TerminationHandling,
) -> ExclusionSet {
    let mut set = ExclusionSet::default();

    if termination_handling == TerminationHandling::Exclude {
        let terminations = KeyColumns {
            key: columns.terminations.key.clone(),
        };
        set.add(
            ExclusionReason::Terminated,
            listed_keys(sources.terminations, &terminations),
        );
    }
    set.add(
        ExclusionReason::Apprentice,
        listed_keys(sources.apprentices, &columns.apprentices),
    );
    set.add(
        ExclusionReason::Intern,
        listed_keys(sources.interns, &columns.interns),
    );
    set.add(
        ExclusionReason::Abroad,
        listed_keys(sources.abroad, &columns.abroad),
    );

    if let Some(leaves) = sources.leaves {
        let key_col = leaves.find_column(&columns.leaves.key);
        let flag_col = leaves.find_column(&columns.leaves.eligibility);
        if let (Some(key_col), Some(flag_col)) = (key_col, flag_col) {
            let keys: BTreeSet<EmployeeKey> = (0..leaves.len())
                .filter(|&row| {
                    leaves
                        .cell(row, flag_col)
                        .as_text()
                        .is_some_and(|flag| vocabulary.is_leave_not_eligible(&flag))
                })
                .filter_map(|row| normalize_key(leaves.cell(row, key_col)))
                .collect();
            set.add(ExclusionReason::Leave, keys);
        }
    }

    set
}
