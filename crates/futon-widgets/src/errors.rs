//! Error types for widget synchronization

use thiserror::Error;

/// Failure reported by a testable capability (lookup, action, refresh).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TestableError {
    /// Element is not ready yet (not rendered, stale, obscured)
    #[error("testable not ready: {0}")]
    NotReady(String),

    /// Element can never satisfy the request; retrying is pointless
    #[error("testable unusable: {0}")]
    Fatal(String),

    /// Operation was cancelled or interrupted
    #[error("operation cancelled")]
    Cancelled,
}

impl TestableError {
    pub fn not_ready(reason: impl Into<String>) -> Self {
        TestableError::NotReady(reason.into())
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        TestableError::Fatal(reason.into())
    }

    /// Check if the engine should keep polling after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, TestableError::NotReady(_))
    }
}

/// Terminal outcome of a synchronization call.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Retry budget exhausted; carries the last underlying failure
    #[error("element not found after {attempts} attempts")]
    ElementNotFound {
        attempts: u32,
        #[source]
        source: TestableError,
    },

    /// A capability reported a non-retryable failure after `attempts`
    /// retryable ones
    #[error("synchronization aborted after {attempts} attempts")]
    Fatal {
        attempts: u32,
        #[source]
        source: TestableError,
    },

    /// Cancellation was requested before the element became ready
    #[error("synchronization cancelled after {attempts} attempts")]
    Cancelled {
        attempts: u32,
        last_error: Option<TestableError>,
    },
}

impl SyncError {
    /// Number of failed attempts recorded before the engine gave up.
    pub fn attempts(&self) -> u32 {
        match self {
            SyncError::ElementNotFound { attempts, .. }
            | SyncError::Fatal { attempts, .. }
            | SyncError::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::ElementNotFound { .. })
    }
}

/// Lets an inner synchronization feed an outer one: exhaustion becomes the
/// last retryable cause again, everything else stays terminal.
impl From<SyncError> for TestableError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::ElementNotFound { source, .. } => source,
            SyncError::Fatal { source, .. } => source,
            SyncError::Cancelled { .. } => TestableError::Cancelled,
        }
    }
}

/// Settings could not be loaded or hold an unusable value.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("settings source unavailable: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn only_not_ready_is_retryable() {
        assert!(TestableError::not_ready("hidden").is_retryable());
        assert!(!TestableError::fatal("detached").is_retryable());
        assert!(!TestableError::Cancelled.is_retryable());
    }

    #[test]
    fn element_not_found_exposes_cause() {
        let err = SyncError::ElementNotFound {
            attempts: 3,
            source: TestableError::not_ready("spinner still visible"),
        };
        assert_eq!(err.to_string(), "element not found after 3 attempts");
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("testable not ready: spinner still visible".to_string())
        );
        assert_eq!(err.attempts(), 3);
        assert!(err.is_not_found());
    }

    #[test]
    fn exhausted_inner_sync_stays_retryable() {
        let inner = SyncError::ElementNotFound {
            attempts: 2,
            source: TestableError::not_ready("row 4"),
        };
        let outer: TestableError = inner.into();
        assert!(outer.is_retryable());

        let cancelled: TestableError = SyncError::Cancelled {
            attempts: 1,
            last_error: None,
        }
        .into();
        assert_eq!(cancelled, TestableError::Cancelled);
    }
}
