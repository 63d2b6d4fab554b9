// 🚨 Error Taxonomy - Typed failures for loads, fetches and cleaners
//
// Fatal errors (UnknownSchemaError, InvalidCategoryError) abort only the call
// that raised them. Row-level and request-level problems are counted or
// recorded and never abort a load or a batch.

use crate::schema::{DocumentKind, Source};
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T, E = Error> = std::result::Result<T, E>;

// ============================================================================
// NAMED TAXONOMY
// ============================================================================

/// No registry entry matches the requested (source, kind, year) triple.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no schema registered for {data_source} {kind} data in {year}")]
pub struct UnknownSchemaError {
    pub data_source: Source,
    pub kind: DocumentKind,
    pub year: i32,
}

/// A page code outside the fixed set of valid detail categories.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code} is not a valid detail category code")]
pub struct InvalidCategoryError {
    pub code: u16,
}

/// A row that could not be placed into the registry schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedRowError {
    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: unreadable record: {reason}")]
    Unreadable { line: usize, reason: String },

    #[error("row {line}: required field {field} missing")]
    MissingField { line: usize, field: String },

    #[error("row {line}: cannot parse {field} value '{value}'")]
    FieldParse {
        line: usize,
        field: String,
        value: String,
    },
}

/// One failed page or detail request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl FetchError {
    /// Timeouts, connection failures, throttling and server errors are worth
    /// another attempt; everything else fails the same way every time.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::Connect(_) => true,
            FetchError::Status(code) => *code == 429 || *code >= 500,
            FetchError::Decode(_) | FetchError::Request(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connect(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

/// A transaction referencing an identifier absent from the entity table.
/// Resolved as a null link; only ever counted and logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no entity with identifier '{identifier}'")]
pub struct EntityResolutionGap {
    pub identifier: String,
}

// ============================================================================
// CRATE ERROR
// ============================================================================

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    UnknownSchema(#[from] UnknownSchemaError),

    #[error(transparent)]
    InvalidCategory(#[from] InvalidCategoryError),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("category {0} is not an aggregate category")]
    NotAggregate(u16),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("table has no column '{0}'")]
    MissingColumn(String),

    #[error("cannot tell document kind and year from file name {0}")]
    UnrecognizedFile(PathBuf),

    #[error("no cleaner available for {0}")]
    NoCleaner(Source),

    #[error("{0} data does not include {1} tables")]
    UnsupportedKind(Source, DocumentKind),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::Timeout.is_transient());
        assert!(FetchError::Connect("refused".into()).is_transient());
        assert!(FetchError::Status(503).is_transient());
        assert!(FetchError::Status(429).is_transient());
        assert!(!FetchError::Status(404).is_transient());
        assert!(!FetchError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn test_unknown_schema_message() {
        let err = UnknownSchemaError {
            data_source: Source::Pennsylvania,
            kind: DocumentKind::Filer,
            year: 1999,
        };
        assert_eq!(
            err.to_string(),
            "no schema registered for Pennsylvania filer data in 1999"
        );
    }
}
