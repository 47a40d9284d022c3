//! Machine-readable summaries of a run, printed by the binary.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::BenefitRun;

/// Outcome of a run that produced an output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// `"ok"`, or `"warnings"` when the run raised any.
    pub status: String,
    /// Where the output table was written.
    pub output: String,
    /// Number of output rows.
    pub rows: usize,
    /// Sum of all benefit values.
    #[serde(with = "rust_decimal::serde::str")]
    pub total_value: Decimal,
    /// Warnings in the order they were raised.
    pub warnings: Vec<String>,
    /// Identifier of the run, also present in every log event.
    pub run_id: Uuid,
    /// Rule set name and version.
    pub rule_set: String,
}

impl RunSummary {
    /// Summarizes a run written to `output`.
    pub fn new(run: &BenefitRun, output: &Path) -> Self {
        let status = if run.warnings.is_empty() {
            "ok"
        } else {
            "warnings"
        };
        Self {
            status: status.to_string(),
            output: output.display().to_string(),
            rows: run.rows.len(),
            total_value: run.total_value(),
            warnings: run.warnings.clone(),
            run_id: run.run_id,
            rule_set: format!("{} {}", run.rule_set, run.rule_version),
        }
    }
}

/// A fatal error, described for callers that parse stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    /// Always `"error"`.
    pub status: String,
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorSummary {
    /// Creates an error summary.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&EngineError> for ErrorSummary {
    fn from(error: &EngineError) -> Self {
        let code = match error {
            EngineError::MissingMandatoryInput { .. } => "MISSING_MANDATORY_INPUT",
            EngineError::SourceNotFound { .. } => "SOURCE_NOT_FOUND",
            EngineError::SourceReadError { .. } => "SOURCE_READ_ERROR",
            EngineError::SourceWriteError { .. } => "SOURCE_WRITE_ERROR",
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                "CONFIG_ERROR"
            }
            EngineError::InvalidConfig { .. } => "INVALID_CONFIG",
        };
        Self::new(code, error.to_string())
    }
}
