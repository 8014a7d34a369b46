//! Error types for reference-table loading and classification input.
//!
//! [`LoadError`] is fatal: without all three reference tables the engine cannot answer
//! anything. [`InputError`] is recoverable and travels back to the caller inside a
//! classification result instead of being raised.
//!
//! # Example
//!
//! ```ignore
//! use derfit_core::LoadError;
//!
//! fn require(headers: &[String], column: &str) -> Result<usize, LoadError> {
//!     headers
//!         .iter()
//!         .position(|h| h == column)
//!         .ok_or_else(|| LoadError::MissingColumn {
//!             table: "municipalities".into(),
//!             column: column.into(),
//!         })
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// Fatal errors raised while loading the reference tables.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A reference source file does not exist
    #[error("reference source not found: {0}")]
    SourceNotFound(String),

    /// A required column is absent after header normalization
    #[error("table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    /// Several columns match a pattern that must identify exactly one
    #[error("table '{table}' has several columns matching '{pattern}': {}", .candidates.join(", "))]
    AmbiguousColumn {
        table: String,
        pattern: String,
        candidates: Vec<String>,
    },

    /// Structurally malformed table (bad CSV, empty header)
    #[error("failed to parse table '{table}': {message}")]
    Parse { table: String, message: String },

    /// I/O errors other than a missing file
    #[error("I/O error reading '{table}': {source}")]
    Io {
        table: String,
        #[source]
        source: std::io::Error,
    },
}

/// Recoverable problems with a classification request.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputError {
    /// A required request field is empty or absent
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    /// Installed load is negative or not a number
    #[error("installed load must be a non-negative number, got {load_kw}")]
    InvalidLoad { load_kw: f64 },

    /// City not present in the municipality table
    #[error("unknown city '{city}'")]
    UnknownCity { city: String },

    /// Phase type not recognized or without admitted categories
    #[error("unknown phase type '{phase}'")]
    UnknownPhaseType { phase: String },

    /// No category row covers the installed load
    #[error("no {phase} category covers {load_kw} kW at voltage {voltage}")]
    NoMatchingCategory {
        voltage: String,
        phase: String,
        load_kw: f64,
    },
}

impl InputError {
    pub fn missing(field: &str) -> Self {
        InputError::MissingField {
            field: field.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display() {
        let err = LoadError::MissingColumn {
            table: "categories".into(),
            column: "carga_instalada".into(),
        };
        assert_eq!(
            err.to_string(),
            "table 'categories' is missing required column 'carga_instalada'"
        );

        let err = LoadError::AmbiguousColumn {
            table: "ceilings".into(),
            pattern: "potencia_maxima".into(),
            candidates: vec!["potencia_maxima_ca".into(), "potencia_maxima_cc".into()],
        };
        assert!(err.to_string().contains("potencia_maxima_ca, potencia_maxima_cc"));
    }

    #[test]
    fn test_input_error_display() {
        let err = InputError::UnknownCity {
            city: "Nowhereville".into(),
        };
        assert_eq!(err.to_string(), "unknown city 'Nowhereville'");
        assert_eq!(
            InputError::missing("city").to_string(),
            "missing required field 'city'"
        );
    }

    #[test]
    fn test_input_error_serializes_with_kind_tag() {
        let err = InputError::UnknownPhaseType {
            phase: "quad".into(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "unknown_phase_type");
        assert_eq!(json["phase"], "quad");
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> Result<(), LoadError> {
            Err(LoadError::SourceNotFound("municipios.csv".into()))
        }

        fn outer() -> Result<(), LoadError> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer(), Err(LoadError::SourceNotFound(_))));
    }
}
