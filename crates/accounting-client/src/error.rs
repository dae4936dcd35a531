use thiserror::Error;

/// Errors from the accounting service, split by retryability.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The service could not be reached (connection refused, timeout,
    /// transport failure). Transient: the saga retries these with backoff.
    #[error("Accounting service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with a non-success status. Permanent: the
    /// saga does not retry an application-level rejection.
    #[error("Accounting service rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl ClientError {
    /// Returns true if the error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_is_retryable() {
        assert!(ClientError::Unavailable("connection refused".into()).is_retryable());
    }

    #[test]
    fn rejected_is_not_retryable() {
        let err = ClientError::Rejected {
            status: 422,
            body: "invalid invoice".into(),
        };
        assert!(!err.is_retryable());
    }
}
