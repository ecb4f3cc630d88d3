//! Error types for fact retrieval and reconciliation.
//!
//! This module defines [`FactsError`]. Conditions that only mean "no data"
//! (a tag missing from the document, an ambiguous unit, a zero denominator)
//! are deliberately not represented here: they surface as empty series or
//! missing cells instead.

use thiserror::Error;

/// Errors that can occur while fetching or reconciling company facts.
#[derive(Error, Debug)]
pub enum FactsError {
    /// Network-related errors (connection failures, timeouts, HTTP status).
    #[error("Network error: {0}")]
    Network(String),

    /// The requested entity (ticker or CIK) is unknown to the directory.
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// The fact document lacks the expected nested structure.
    #[error("Malformed fact document: {0}")]
    MalformedDocument(String),

    /// Error decoding a payload returned by a source.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An invalid parameter was provided by the caller.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No source of the required kind is registered.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// The requested feature is not supported by a source.
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// The presentation collaborator failed to render a chart.
    #[error("Render error: {0}")]
    Render(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`FactsError`].
pub type Result<T> = std::result::Result<T, FactsError>;
