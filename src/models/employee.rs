//! Employee records reconciled by the benefit pipeline.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A canonical employee identifier.
///
/// Keys are only ever built by the identifier normalizer, so two keys compare
/// equal exactly when their sources referred to the same employee.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeKey(String);

impl EmployeeKey {
    pub(crate) fn from_canonical(value: String) -> Self {
        Self(value)
    }

    /// Returns the canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A termination notice attached to an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationNotice {
    /// Whether the termination was formally communicated.
    pub communicated: bool,
    /// The termination date, absent when missing or unparseable.
    pub date: Option<NaiveDate>,
}

impl TerminationNotice {
    /// Returns the termination date when the notice is actionable.
    ///
    /// Only communicated notices with a readable date take part in proration.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        if self.communicated { self.date } else { None }
    }
}

/// One roster row, as read from the active-employee source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Canonical employee key.
    pub key: EmployeeKey,
    /// Employee name.
    pub name: Option<String>,
    /// Employing company.
    pub company: Option<String>,
    /// Role title, used by the role filter.
    pub role_title: Option<String>,
    /// Bargaining-unit name, used by both lookups.
    pub unit_name: Option<String>,
    /// Employment status, used by the status filter.
    pub status: Option<String>,
    /// Admission date, when the employee joined during or near the period.
    pub admission_date: Option<NaiveDate>,
    /// Pending termination, if any.
    pub termination: Option<TerminationNotice>,
    /// Vacation days in the period. Informational only.
    #[serde(default)]
    pub vacation_days: u32,
}

impl EmployeeRecord {
    /// Creates a record carrying only a key; every other field is absent.
    ///
    /// # Example
    ///
    /// ```
    /// use meal_benefit_engine::calculation::normalize_key_text;
    /// use meal_benefit_engine::models::EmployeeRecord;
    ///
    /// let key = normalize_key_text("1001.0").unwrap();
    /// let record = EmployeeRecord::new(key);
    /// assert_eq!(record.key.as_str(), "1001");
    /// assert_eq!(record.vacation_days, 0);
    /// ```
    pub fn new(key: EmployeeKey) -> Self {
        Self {
            key,
            name: None,
            company: None,
            role_title: None,
            unit_name: None,
            status: None,
            admission_date: None,
            termination: None,
            vacation_days: 0,
        }
    }
}
