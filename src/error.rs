//! Error types for sqlhelper.

use thiserror::Error;

/// Driver code for a duplicate-key violation.
pub const DUPLICATE_ENTRY_CODE: &str = "ER_DUP_ENTRY";

/// Error code reported by the database driver.
///
/// Only the duplicate-key violation gets special treatment; every other
/// code is carried through as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverErrorCode {
    /// Duplicate-key / unique constraint violation.
    DuplicateEntry,
    /// Any other code (possibly empty when the driver reports none).
    Other(String),
}

impl DriverErrorCode {
    /// Classify a raw driver code string.
    pub fn from_code(code: &str) -> Self {
        match code {
            DUPLICATE_ENTRY_CODE => Self::DuplicateEntry,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::DuplicateEntry => DUPLICATE_ENTRY_CODE,
            Self::Other(code) => code,
        }
    }
}

/// An error surfaced by a pool or connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    pub code: DriverErrorCode,
    pub message: String,
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code.as_str() {
            "" => write!(f, "{}", self.message),
            code => write!(f, "{} (code: {})", self.message, code),
        }
    }
}

impl std::error::Error for DriverError {}

impl DriverError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: DriverErrorCode::from_code(code),
            message: message.into(),
        }
    }

    /// A driver error with no code attached.
    pub fn uncoded(message: impl Into<String>) -> Self {
        Self {
            code: DriverErrorCode::Other(String::new()),
            message: message.into(),
        }
    }

    /// A duplicate-key violation.
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self {
            code: DriverErrorCode::DuplicateEntry,
            message: message.into(),
        }
    }
}

/// The main error type for sqlhelper operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No connection was available to run the statement on.
    #[error("No database connection")]
    NoDbConnection,

    /// The pool reported success but handed back no connection.
    #[error("Missing connection from pool")]
    MissingConnection,

    /// The statement violated a unique constraint.
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// The statement failed for any other reason.
    #[error("Unknown database error: {0}")]
    Unknown(String),

    /// The statement returned nothing and an empty response was not allowed.
    #[error("No query results")]
    NoQueryResults,

    /// Caller passed something unusable (e.g. an empty field list).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A result did not have the shape the call site asked for.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Driver failure propagated verbatim (acquisition, BEGIN, COMMIT, ROLLBACK).
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QueryError {
    /// Classify a statement failure by its driver code.
    pub fn classify(err: DriverError) -> Self {
        match err.code {
            DriverErrorCode::DuplicateEntry => Self::Duplicate(err.message),
            DriverErrorCode::Other(_) => Self::Unknown(err.message),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}

/// Result type alias for sqlhelper operations.
pub type HelperResult<T> = Result<T, QueryError>;
