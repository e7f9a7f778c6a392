//! Custom error types for ledger-etl
//!
//! This module defines the error hierarchy for the extraction pipeline using
//! thiserror. Conditions the pipeline recovers from locally (an unavailable
//! account plan, an interrupted page fetch) are still distinct variants so
//! callers can tell them apart.

use thiserror::Error;

/// The main error type for ledger-etl operations
#[derive(Error, Debug)]
pub enum EtlError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Transport failure before any HTTP status was received
    #[error("HTTP error: {0}")]
    Http(String),

    /// The chart of accounts could not be obtained for a company
    #[error("Account plan unavailable for {company}: {reason}")]
    PlanUnavailable { company: String, reason: String },

    /// A request kept failing after the retry budget was spent
    #[error(
        "Transient fetch failure after {attempts} attempt(s){}",
        failure_suffix(.status, .last_error)
    )]
    TransientFetchFailure {
        status: Option<u16>,
        attempts: u32,
        /// Transport error of the last attempt, when it never got a status
        last_error: Option<String>,
    },

    /// Pagination never reached an empty page
    #[error("Pagination stopped after {pages} page(s) without reaching the end of the data")]
    PageLimit { pages: u32 },

    /// A ledger entry is missing a field the normalization cannot do without
    #[error("Malformed ledger entry: missing or invalid '{field}' in {entry}")]
    MalformedEntry { field: &'static str, entry: String },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Company directory errors
    #[error("Company directory error: {0}")]
    Directory(String),

    /// Dates that cannot be turned into an extraction range
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

impl EtlError {
    /// Create a "not found" error for companies in the directory
    pub fn company_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Company",
            identifier: identifier.into(),
        }
    }

    /// Create a plan-unavailable error for a company
    pub fn plan_unavailable(company: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PlanUnavailable {
            company: company.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if the retry budget was exhausted or the transport failed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientFetchFailure { .. } | Self::Http(_))
    }

    /// Check if the account plan could not be resolved
    pub fn is_plan_unavailable(&self) -> bool {
        matches!(self, Self::PlanUnavailable { .. })
    }

    /// Check if a raw entry failed normalization
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedEntry { .. })
    }
}

fn failure_suffix(status: &Option<u16>, last_error: &Option<String>) -> String {
    match (status, last_error) {
        (Some(status), _) => format!(" (last status {})", status),
        (None, Some(err)) => format!(" ({})", err),
        (None, None) => String::new(),
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for EtlError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EtlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<reqwest::Error> for EtlError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<csv::Error> for EtlError {
    fn from(err: csv::Error) -> Self {
        Self::Directory(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for EtlError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for ledger-etl operations
pub type EtlResult<T> = Result<T, EtlError>;
