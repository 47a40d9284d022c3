//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading benefit rule
//! sets from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::Holiday;

use super::types::{ColumnMap, HolidayFile, RuleSet, RulesFile, Vocabulary};

/// Loads and provides access to a benefit rule set.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/vr_2025_05/
/// ├── rules.yaml          # Name, version, period, rounding, cost split
/// ├── vocabulary.yaml     # Role keywords, status and flag values, regions
/// ├── columns.yaml        # Header aliases per source (optional)
/// └── holidays/
///     └── 2025.yaml       # Holidays on the business calendar (optional)
/// ```
///
/// # Example
///
/// ```no_run
/// use meal_benefit_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/vr_2025_05").unwrap();
/// println!("Loaded rule set: {}", loader.rule_set().metadata().name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    rule_set: RuleSet,
}

impl ConfigLoader {
    /// Loads a rule set from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - `rules.yaml` or `vocabulary.yaml` is missing
    /// - Any file contains invalid YAML
    /// - The period or cost split is inconsistent
    ///
    /// # Example
    ///
    /// ```no_run
    /// use meal_benefit_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/vr_2025_05")?;
    /// # Ok::<(), meal_benefit_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let rules = Self::load_yaml::<RulesFile>(&path.join("rules.yaml"))?;
        let vocabulary = Self::load_yaml::<Vocabulary>(&path.join("vocabulary.yaml"))?;

        let columns_path = path.join("columns.yaml");
        let columns = if columns_path.exists() {
            Self::load_yaml::<ColumnMap>(&columns_path)?
        } else {
            ColumnMap::default()
        };

        let holidays = Self::load_holidays(&path.join("holidays"))?;

        let rule_set = RuleSet::new(rules.rule_set, rules.period, vocabulary, columns, holidays)
            .with_rounding(rules.rounding)
            .with_termination_handling(rules.termination_handling)
            .with_cost_split(rules.cost_split)
            .with_output_sheet(rules.output_sheet);
        rule_set.validate()?;

        debug!(
            name = %rule_set.metadata().name,
            version = %rule_set.metadata().version,
            holidays = rule_set.holidays().len(),
            "Loaded rule set"
        );

        Ok(Self { rule_set })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every holiday file; a missing directory means weekends only.
    fn load_holidays(holidays_dir: &Path) -> EngineResult<Vec<Holiday>> {
        if !holidays_dir.exists() {
            return Ok(Vec::new());
        }

        let holidays_dir_str = holidays_dir.display().to_string();
        let entries = fs::read_dir(holidays_dir).map_err(|_| EngineError::ConfigNotFound {
            path: holidays_dir_str.clone(),
        })?;

        let mut holidays = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: holidays_dir_str.clone(),
            })?;

            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
            {
                let file = Self::load_yaml::<HolidayFile>(&path)?;
                holidays.extend(file.holidays);
            }
        }

        Ok(holidays)
    }

    /// Returns the loaded rule set.
    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    /// Consumes the loader, returning the rule set.
    pub fn into_rule_set(self) -> RuleSet {
        self.rule_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RoundingPolicy, TerminationHandling};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn config_path() -> &'static str {
        "./config/vr_2025_05"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const RULES: &str = r#"
rule_set:
  name: Test
  version: "1"
period:
  start: 2025-04-15
  end: 2025-05-15
  cutoff: 2025-05-15
"#;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_shipped_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let rules = result.unwrap().into_rule_set();
        assert_eq!(rules.metadata().version, "2025-05");
        assert_eq!(
            rules.period().cutoff,
            NaiveDate::from_ymd_opt(2025, 5, 15).unwrap()
        );
        assert_eq!(rules.rounding(), RoundingPolicy::HalfEven);
        assert_eq!(rules.termination_handling(), TerminationHandling::Exclude);
        assert_eq!(rules.total_business_days(), 20);
    }

    #[test]
    fn test_shipped_configuration_has_cost_split() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let split = loader.rule_set().cost_split().unwrap();
        assert_eq!(split.employer_percent, dec("80"));
        assert_eq!(split.employee_percent, dec("20"));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("rules.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_columns_and_holidays_are_optional() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "rules.yaml", RULES);
        write(dir.path(), "vocabulary.yaml", "{}\n");

        let rules = ConfigLoader::load(dir.path()).unwrap().into_rule_set();
        assert!(rules.holidays().is_empty());
        assert_eq!(rules.total_business_days(), 23);
        assert_eq!(rules.columns(), &ColumnMap::default());
    }

    #[test]
    fn test_invalid_yaml_returns_parse_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "rules.yaml", "rule_set: [unterminated\n");
        write(dir.path(), "vocabulary.yaml", "{}\n");

        match ConfigLoader::load(dir.path()) {
            Err(EngineError::ConfigParseError { path, .. }) => {
                assert!(path.contains("rules.yaml"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_split_not_summing_to_100_is_rejected() {
        let dir = TempDir::new().unwrap();
        let rules = format!(
            "{}cost_split:\n  employer_percent: 70\n  employee_percent: 20\n",
            RULES
        );
        write(dir.path(), "rules.yaml", &rules);
        write(dir.path(), "vocabulary.yaml", "{}\n");

        assert!(matches!(
            ConfigLoader::load(dir.path()),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_holiday_files_are_merged_and_sorted() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "rules.yaml", RULES);
        write(dir.path(), "vocabulary.yaml", "{}\n");
        write(
            dir.path(),
            "holidays/b.yaml",
            "holidays:\n  - date: 2025-05-01\n    name: Dia do Trabalho\n",
        );
        write(
            dir.path(),
            "holidays/a.yml",
            "holidays:\n  - date: 2025-04-21\n    name: Tiradentes\n",
        );
        write(dir.path(), "holidays/notes.txt", "ignored");

        let rules = ConfigLoader::load(dir.path()).unwrap().into_rule_set();
        let dates: Vec<_> = rules.holidays().iter().map(|h| h.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 4, 21).unwrap(),
                NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            ]
        );
        assert_eq!(rules.total_business_days(), 21);
    }
}
