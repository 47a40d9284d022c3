//! Error types for the meal benefit engine.
//!
//! Only conditions that halt a run are modelled here. Business-rule anomalies
//! (unresolved lookups, malformed dates, structural gaps in the output) are
//! absorbed by the pipeline with a fallback and reported as validation warnings.

use thiserror::Error;

/// The main error type for the meal benefit engine.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::error::EngineError;
///
/// let error = EngineError::MissingMandatoryInput {
///     table: "roster".to_string(),
/// };
/// assert_eq!(error.to_string(), "Mandatory input table is missing: roster");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The roster table was not supplied; nothing can be computed.
    #[error("Mandatory input table is missing: {table}")]
    MissingMandatoryInput {
        /// The logical name of the missing table.
        table: String,
    },

    /// A source file named by the caller does not exist.
    #[error("Source not found: {path}")]
    SourceNotFound {
        /// The path that was not found.
        path: String,
    },

    /// A source file exists but could not be read as a table.
    #[error("Failed to read source '{path}': {message}")]
    SourceReadError {
        /// The path of the unreadable source.
        path: String,
        /// A description of the read failure.
        message: String,
    },

    /// The output table could not be written.
    #[error("Failed to write table to '{path}': {message}")]
    SourceWriteError {
        /// The destination path.
        path: String,
        /// A description of the write failure.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but describes an impossible rule set.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// A description of the inconsistency.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_mandatory_input_displays_table() {
        let error = EngineError::MissingMandatoryInput {
            table: "roster".to_string(),
        };
        assert_eq!(error.to_string(), "Mandatory input table is missing: roster");
    }

    #[test]
    fn test_source_not_found_displays_path() {
        let error = EngineError::SourceNotFound {
            path: "/data/ATIVOS.xlsx".to_string(),
        };
        assert_eq!(error.to_string(), "Source not found: /data/ATIVOS.xlsx");
    }

    #[test]
    fn test_source_read_error_displays_path_and_message() {
        let error = EngineError::SourceReadError {
            path: "/data/broken.xlsx".to_string(),
            message: "invalid zip header".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to read source '/data/broken.xlsx': invalid zip header"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/rules/rules.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/rules/rules.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_invalid_config_displays_message() {
        let error = EngineError::InvalidConfig {
            message: "period start is after period end".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration: period start is after period end"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_missing_roster() -> EngineResult<()> {
            Err(EngineError::MissingMandatoryInput {
                table: "roster".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_missing_roster()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
