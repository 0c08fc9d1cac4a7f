//! Error types for the discovery pipeline

use aliased_client::{ErrorKind, ProviderError};
use aliased_core::StoreError;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Terminal failure of a discovery run
#[derive(Debug, Error)]
pub enum FetchError {
    /// A provider call failed with a non-ignored error
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The cancellation token fired before the run completed
    #[error("discovery cancelled")]
    Cancelled,

    /// Persisting the result failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid pipeline configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The provider returned the same account twice
    #[error("account {0} listed more than once")]
    DuplicateAccount(String),

    /// A worker task panicked or was aborted
    #[error("worker failed: {0}")]
    Worker(String),
}

impl FetchError {
    /// The kind tag reported to the operator
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Provider(e) => e.kind(),
            FetchError::Cancelled => ErrorKind::Cancelled,
            FetchError::Store(_) => ErrorKind::Io,
            FetchError::Config(_) => ErrorKind::Configuration,
            FetchError::DuplicateAccount(_) | FetchError::Worker(_) => ErrorKind::Service,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(FetchError::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(
            FetchError::from(ProviderError::authentication("bad key")).kind(),
            ErrorKind::Authentication
        );
        assert_eq!(FetchError::Config("x".into()).kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_provider_message_passes_through() {
        let err = FetchError::from(ProviderError::transport("connection reset"));
        assert_eq!(err.to_string(), "connection reset");
        assert!(!err.is_cancelled());
    }
}
