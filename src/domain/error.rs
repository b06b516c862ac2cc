// ============================================================
// Layer 3 — Review Errors
// ============================================================
// Every failure the review core can report. None of them are
// fatal: callers print the message, record it in the session
// log and leave the model as it was.
//
// Dangling figure references are deliberately NOT an error
// kind. They are filtered out wherever figures are resolved.

use thiserror::Error;

/// Errors raised by the registry, the store and the collaborators.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// A load payload was malformed (missing id, bad page, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation referenced an exercise id that is not loaded
    #[error("exercise '{0}' not found")]
    NotFound(String),

    /// The extraction service or the persistence mirror failed
    #[error("remote call failed: {0}")]
    RemoteFailure(String),

    /// A request or snapshot could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReviewError {
    /// Shorthand for `InvalidInput`
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Shorthand for `RemoteFailure`
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::RemoteFailure(msg.into())
    }
}

/// Shorthand used across the model and infra layers
pub type ReviewResult<T> = Result<T, ReviewError>;

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        assert_eq!(
            ReviewError::NotFound("EX_9".into()).to_string(),
            "exercise 'EX_9' not found"
        );
        assert_eq!(
            ReviewError::remote("Error 500").to_string(),
            "remote call failed: Error 500"
        );
    }
}
