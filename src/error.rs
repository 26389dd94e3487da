//! Custom error types for rustopenreview.
//!
//! This module defines all error types used throughout the application.
//! Data-quality gates (unknown decision labels, decision cardinality,
//! overlapping outcome sets, malformed content fields) are explicit variants
//! so a run stops on them instead of writing a misleading table.

use thiserror::Error;

/// Main error type for rustopenreview operations.
#[derive(Debug, Error)]
pub enum OpenReviewError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// External API returned an error
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: i32,
        /// Error message from API
        message: String,
    },

    /// Response body could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// A decision label that is not in the year's label table
    #[error("Unknown decision label {label:?} ({context})")]
    UnknownLabel {
        /// Where the label was read (venue year, field)
        context: String,
        /// The label as found in the record
        label: String,
    },

    /// Paper expected to have exactly one decision record
    #[error("Expected exactly one decision record for paper {number}, found {found}")]
    DecisionCardinality {
        /// Paper number
        number: i64,
        /// Number of decision records returned
        found: usize,
    },

    /// Outcome id sets that must be disjoint share ids
    #[error("{left} and {right} submissions overlap: {ids:?}")]
    OverlappingOutcomes {
        left: &'static str,
        right: &'static str,
        ids: Vec<String>,
    },

    /// Required content field absent from a record
    #[error("Missing required field `{field}` in record {record}")]
    MissingField { field: String, record: String },

    /// v2 content field whose wrapper is not exactly `{value: ...}`
    #[error("Malformed field `{field}` in record {record}: expected a single `value` entry, found {keys} key(s)")]
    MalformedField {
        field: String,
        record: String,
        keys: usize,
    },

    /// Plain serialization refused a field; retried with escaping
    #[error("Field in column `{column}` needs escaping")]
    Escape { column: String },

    /// Credentials file lacks a section or key
    #[error("Missing credential `{key}` in section [BASIC]")]
    MissingCredential { key: String },

    /// Venue year without a known invitation table
    #[error("Unsupported venue year: {0}")]
    UnsupportedYear(u16),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Credentials file could not be read or parsed
    #[error("Credentials error: {0}")]
    Ini(#[from] ini::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias using `OpenReviewError`
pub type Result<T> = std::result::Result<T, OpenReviewError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| OpenReviewError::Parse(msg.to_string()))
    }
}
