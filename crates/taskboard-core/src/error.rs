use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskboardError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Server responded with {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No user is signed in")]
    Unauthenticated,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskboardError {
    /// Failures that reconciliation may absorb. Missing credentials and
    /// caller mistakes must reach the caller instead.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TaskboardError::Connection(_)
                | TaskboardError::Http { .. }
                | TaskboardError::Serialization(_)
                | TaskboardError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_are_recoverable() {
        assert!(TaskboardError::Connection("refused".into()).is_recoverable());
        assert!(TaskboardError::Http {
            status: 502,
            body: String::new()
        }
        .is_recoverable());
    }

    #[test]
    fn test_auth_and_validation_are_not_recoverable() {
        assert!(!TaskboardError::Unauthenticated.is_recoverable());
        assert!(!TaskboardError::Validation("empty title".into()).is_recoverable());
        assert!(!TaskboardError::NotFound("task 3".into()).is_recoverable());
    }
}
