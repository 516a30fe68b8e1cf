//! Result and error types for Esperar.

use thiserror::Error;

/// Result type for Esperar operations
pub type EsperarResult<T> = Result<T, EsperarError>;

/// Failure kinds a page query can report.
///
/// A wait may be configured to treat some of these as "not yet satisfied"
/// and keep polling; everything else aborts the wait immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorKind {
    /// No entity matched the locator
    NotFound,
    /// A previously located entity is no longer attached to the page
    Stale,
    /// The entity exists but cannot receive the requested interaction
    NotInteractable,
    /// Script evaluation inside the page failed
    ScriptError,
    /// The underlying automation driver reported an error
    Driver,
}

impl QueryErrorKind {
    /// Human-readable kind name used in error messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::Stale => "stale",
            Self::NotInteractable => "not interactable",
            Self::ScriptError => "script error",
            Self::Driver => "driver error",
        }
    }
}

impl std::fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error raised by a page query, carrying a distinguishable kind
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct QueryError {
    /// What class of failure this is
    pub kind: QueryErrorKind,
    /// Details for diagnostics
    pub message: String,
}

impl QueryError {
    /// Create a new query error
    #[must_use]
    pub fn new(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Entity-not-found error for a locator description
    #[must_use]
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::new(QueryErrorKind::NotFound, format!("no match for {what}"))
    }
}

/// Errors that can occur in Esperar
#[derive(Debug, Error)]
pub enum EsperarError {
    /// Wait configuration is invalid (bad timeout/poll interval)
    #[error("Invalid wait configuration: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },

    /// Condition was not satisfied within the allowed time
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    WaitTimeout {
        /// Timeout that was allowed, in milliseconds
        ms: u64,
        /// Description of what was being waited for
        waited_for: String,
    },

    /// A query failed with a kind the wait was not configured to ignore
    #[error("Query failed: {0}")]
    Query(#[from] QueryError),

    /// Screenshot capture or persistence failed
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Test data could not be loaded or was malformed
    #[error("Test data error: {message}")]
    Data {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_kind_display() {
        assert_eq!(QueryErrorKind::NotFound.as_str(), "not found");
        assert_eq!(format!("{}", QueryErrorKind::Stale), "stale");
        assert_eq!(
            format!("{}", QueryErrorKind::NotInteractable),
            "not interactable"
        );
    }

    #[test]
    fn test_query_error_message() {
        let err = QueryError::new(QueryErrorKind::Driver, "session lost");
        assert_eq!(format!("{err}"), "driver error: session lost");
    }

    #[test]
    fn test_query_error_not_found() {
        let err = QueryError::not_found("css selector `#submit`");
        assert_eq!(err.kind, QueryErrorKind::NotFound);
        assert!(err.message.contains("#submit"));
    }

    #[test]
    fn test_wait_timeout_embeds_timeout_and_description() {
        let err = EsperarError::WaitTimeout {
            ms: 10_000,
            waited_for: "visibility of id `login`".to_string(),
        };
        let rendered = format!("{err}");
        assert!(rendered.contains("10000ms"));
        assert!(rendered.contains("visibility of id `login`"));
    }

    #[test]
    fn test_query_error_converts_to_esperar_error() {
        let err: EsperarError = QueryError::new(QueryErrorKind::ScriptError, "boom").into();
        assert!(matches!(err, EsperarError::Query(_)));
    }
}
