//! Mapping source roles to files and loading them as a batch.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::engine::SourceTables;
use crate::error::{EngineError, EngineResult};

use super::loader::{FileTableLoader, TableLoader};

/// The file each source role is read from.
///
/// Entries are file names relative to the data directory. A named file that
/// does not exist is an error; an omitted entry leaves the source absent.
///
/// ```yaml
/// roster: ATIVOS.xlsx
/// terminations: DESLIGADOS.xlsx
/// unit_calendar: Base dias uteis.xlsx
/// unit_rates: Base sindicato x valor.xlsx
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceManifest {
    /// Active employees.
    pub roster: Option<String>,
    /// Terminations.
    pub terminations: Option<String>,
    /// Admissions during the period.
    pub admissions: Option<String>,
    /// Leaves.
    pub leaves: Option<String>,
    /// Apprentices.
    pub apprentices: Option<String>,
    /// Interns.
    pub interns: Option<String>,
    /// Employees working abroad.
    pub abroad: Option<String>,
    /// Vacation days.
    pub vacations: Option<String>,
    /// Bargaining-unit calendar.
    pub unit_calendar: Option<String>,
    /// Per-region rates.
    pub unit_rates: Option<String>,
}

impl SourceManifest {
    /// The file names the monthly HR exports are delivered under.
    pub fn standard() -> Self {
        Self {
            roster: Some("ATIVOS.xlsx".to_string()),
            terminations: Some("DESLIGADOS.xlsx".to_string()),
            admissions: Some("ADMISSÃO ABRIL.xlsx".to_string()),
            leaves: Some("AFASTAMENTOS.xlsx".to_string()),
            apprentices: Some("APRENDIZ.xlsx".to_string()),
            interns: Some("ESTÁGIO.xlsx".to_string()),
            abroad: Some("EXTERIOR.xlsx".to_string()),
            vacations: Some("FÉRIAS.xlsx".to_string()),
            unit_calendar: Some("Base dias uteis.xlsx".to_string()),
            unit_rates: Some("Base sindicato x valor.xlsx".to_string()),
        }
    }

    /// Reads a manifest from a YAML file.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        if !path.is_file() {
            return Err(EngineError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| EngineError::ConfigParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Drops the entries whose file does not exist under the loader's base
    /// directory.
    pub fn present_in(&self, loader: &FileTableLoader) -> Self {
        let keep = |entry: &Option<String>| {
            entry
                .as_ref()
                .filter(|name| loader.resolve(name).is_file())
                .cloned()
        };
        Self {
            roster: keep(&self.roster),
            terminations: keep(&self.terminations),
            admissions: keep(&self.admissions),
            leaves: keep(&self.leaves),
            apprentices: keep(&self.apprentices),
            interns: keep(&self.interns),
            abroad: keep(&self.abroad),
            vacations: keep(&self.vacations),
            unit_calendar: keep(&self.unit_calendar),
            unit_rates: keep(&self.unit_rates),
        }
    }

    /// Returns `(role, file)` for every named entry.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("roster", &self.roster),
            ("terminations", &self.terminations),
            ("admissions", &self.admissions),
            ("leaves", &self.leaves),
            ("apprentices", &self.apprentices),
            ("interns", &self.interns),
            ("abroad", &self.abroad),
            ("vacations", &self.vacations),
            ("unit_calendar", &self.unit_calendar),
            ("unit_rates", &self.unit_rates),
        ]
        .into_iter()
        .filter_map(|(role, entry)| entry.as_deref().map(|file| (role, file)))
        .collect()
    }
}

/// Loads every source the manifest names.
///
/// # Errors
///
/// Propagates the loader's `SourceNotFound` or `SourceReadError` for the
/// first named source that cannot be loaded.
pub fn load_sources<L: TableLoader + ?Sized>(
    loader: &L,
    manifest: &SourceManifest,
) -> EngineResult<SourceTables> {
    let load = |role: &str, entry: &Option<String>| -> EngineResult<_> {
        match entry {
            Some(file) => {
                let table = loader.load(file)?;
                debug!(role, file = %file, rows = table.len(), "Loaded source");
                Ok(Some(table))
            }
            None => Ok(None),
        }
    };

    let sources = SourceTables {
        roster: load("roster", &manifest.roster)?,
        terminations: load("terminations", &manifest.terminations)?,
        admissions: load("admissions", &manifest.admissions)?,
        leaves: load("leaves", &manifest.leaves)?,
        apprentices: load("apprentices", &manifest.apprentices)?,
        interns: load("interns", &manifest.interns)?,
        abroad: load("abroad", &manifest.abroad)?,
        vacations: load("vacations", &manifest.vacations)?,
        unit_calendar: load("unit_calendar", &manifest.unit_calendar)?,
        unit_rates: load("unit_rates", &manifest.unit_rates)?,
    };

    info!(sources = manifest.entries().len(), "Loaded sources");
    Ok(sources)
}

/// Describes a source as JSON: its columns, row count and the first `rows`
/// rows keyed by column.
///
/// # Example
///
/// ```no_run
/// use meal_benefit_engine::io::{FileTableLoader, inspect_table};
///
/// let summary = inspect_table(&FileTableLoader::new("./data"), "ATIVOS.xlsx", 5)?;
/// println!("{}", serde_json::to_string_pretty(&summary).unwrap());
/// # Ok::<(), meal_benefit_engine::error::EngineError>(())
/// ```
pub fn inspect_table<L: TableLoader + ?Sized>(
    loader: &L,
    source: &str,
    rows: usize,
) -> EngineResult<Value> {
    let table = loader.load(source)?;
    let head = table.head(rows);
    let sample: Vec<Value> = head
        .rows()
        .iter()
        .map(|row| {
            let fields: serde_json::Map<String, Value> = table
                .columns()
                .iter()
                .zip(row.iter())
                .map(|(column, cell)| {
                    let value = cell.as_text().map(Value::String).unwrap_or(Value::Null);
                    (column.clone(), value)
                })
                .collect();
            Value::Object(fields)
        })
        .collect();

    Ok(json!({
        "source": source,
        "columns": table.columns(),
        "rows": table.len(),
        "sample": sample,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ativos.csv"),
            "MATRICULA;EMPRESA;SINDICATO\n1001;ACME;SINDPD SP\n1002;ACME;SINDPD RJ\n",
        )
        .unwrap();
        fs::write(dir.path().join("ferias.csv"), "MATRICULA;DIAS DE FÉRIAS\n1001;10\n").unwrap();
        dir
    }

    #[test]
    fn test_omitted_entries_stay_absent() {
        let dir = create_test_dir();
        let manifest = SourceManifest {
            roster: Some("ativos.csv".to_string()),
            vacations: Some("ferias.csv".to_string()),
            ..Default::default()
        };

        let sources = load_sources(&FileTableLoader::new(dir.path()), &manifest).unwrap();
        assert_eq!(sources.roster.as_ref().map(|t| t.len()), Some(2));
        assert_eq!(sources.vacations.as_ref().map(|t| t.len()), Some(1));
        assert!(sources.terminations.is_none());
        assert!(sources.unit_rates.is_none());
    }

    #[test]
    fn test_named_but_missing_source_is_fatal() {
        let dir = create_test_dir();
        let manifest = SourceManifest {
            roster: Some("ativos.csv".to_string()),
            terminations: Some("DESLIGADOS.xlsx".to_string()),
            ..Default::default()
        };

        let result = load_sources(&FileTableLoader::new(dir.path()), &manifest);
        assert!(matches!(result, Err(EngineError::SourceNotFound { .. })));
    }

    #[test]
    fn test_present_in_keeps_existing_files_only() {
        let dir = create_test_dir();
        let manifest = SourceManifest {
            roster: Some("ativos.csv".to_string()),
            ..SourceManifest::standard()
        };

        let present = manifest.present_in(&FileTableLoader::new(dir.path()));
        assert_eq!(present.entries(), vec![("roster", "ativos.csv")]);
    }

    #[test]
    fn test_manifest_from_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sources.yaml");
        fs::write(&path, "roster: ATIVOS.xlsx\nunit_rates: Base sindicato x valor.xlsx\n").unwrap();

        let manifest = SourceManifest::from_file(&path).unwrap();
        assert_eq!(manifest.roster.as_deref(), Some("ATIVOS.xlsx"));
        assert_eq!(
            manifest.unit_rates.as_deref(),
            Some("Base sindicato x valor.xlsx")
        );
        assert!(manifest.leaves.is_none());
    }

    #[test]
    fn test_unknown_manifest_role_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sources.yaml");
        fs::write(&path, "payroll: FOLHA.xlsx\n").unwrap();

        assert!(matches!(
            SourceManifest::from_file(&path),
            Err(EngineError::ConfigParseError { .. })
        ));
    }

    #[test]
    fn test_inspect_table_sample() {
        let dir = create_test_dir();
        let summary = inspect_table(&FileTableLoader::new(dir.path()), "ativos.csv", 1).unwrap();

        assert_eq!(summary["columns"], json!(["MATRICULA", "EMPRESA", "SINDICATO"]));
        assert_eq!(summary["rows"], json!(2));
        assert_eq!(summary["sample"].as_array().map(Vec::len), Some(1));
        assert_eq!(summary["sample"][0]["SINDICATO"], json!("SINDPD SP"));
    }
}
