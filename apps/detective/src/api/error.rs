//! # Client Errors
//!
//! Every failure the app layer can report, normalized from transport, HTTP
//! and parsing errors.

use detective_core::DetectiveError;
use thiserror::Error;

/// Errors from the REST client and the stateful sessions built on it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend could not be reached (connect, timeout, TLS).
    #[error("Cannot reach backend at {url}: {message}")]
    Network { url: String, message: String },

    /// The backend answered with a non-success status.
    ///
    /// `detail` is the `detail` field of the JSON error body, or the status
    /// reason when the body has none.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// A success body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The operation needs a logged-in session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The hint budget of the case is spent.
    #[error("No hints remaining")]
    NoHintsRemaining,

    /// The CLI needs an active case and none is selected.
    #[error("No case selected (run `detective case <id>` first)")]
    NoActiveCase,

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] DetectiveError),
}

impl ApiError {
    /// HTTP status of the error, if the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Message shown when a response carries no usable `detail`.
pub(crate) fn status_reason(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_string(), str::to_string)
}

/// Extract the `detail` of a JSON error body.
///
/// String details are used verbatim; structured details (validation error
/// lists) are rendered as compact JSON.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
