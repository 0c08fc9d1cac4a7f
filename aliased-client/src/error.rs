//! Error types for the provider client

use std::fmt;
use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Tag describing how a failure should be treated by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing master profile or malformed role name; no API call was made
    Configuration,
    /// Master credentials rejected by the provider
    Authentication,
    /// Caller is not allowed to perform the action (AccessDenied family)
    AuthorizationDenied,
    /// Network failure, timeout or throttling
    Transport,
    /// The run was cancelled
    Cancelled,
    /// Local filesystem failure
    Io,
    /// An MFA token is required but there is no terminal to ask for it
    MfaUnavailable,
    /// Any other fault reported by the provider
    Service,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Authentication => "authentication",
            ErrorKind::AuthorizationDenied => "authorization-denied",
            ErrorKind::Transport => "transport",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Io => "io",
            ErrorKind::MfaUnavailable => "mfa-unavailable",
            ErrorKind::Service => "service",
        }
    }

    /// Maps a provider error code to a kind
    ///
    /// Unknown codes are `Service`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "AccessDenied" | "AccessDeniedException" | "AccessDeniedForDependencyException" => {
                ErrorKind::AuthorizationDenied
            }
            "UnrecognizedClientException"
            | "InvalidClientTokenId"
            | "ExpiredToken"
            | "ExpiredTokenException"
            | "SignatureDoesNotMatch"
            | "InvalidSignatureException"
            | "IncompleteSignature"
            | "MissingAuthenticationToken"
            | "AuthFailure" => ErrorKind::Authentication,
            "Throttling"
            | "ThrottlingException"
            | "TooManyRequestsException"
            | "RequestTimeout"
            | "RequestTimeoutException"
            | "ServiceUnavailable"
            | "ServiceUnavailableException" => ErrorKind::Transport,
            _ => ErrorKind::Service,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by the provider facade, tagged with its [`ErrorKind`]
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProviderError {
    kind: ErrorKind,
    message: String,
}

impl ProviderError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn authorization_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthorizationDenied, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn mfa_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MfaUnavailable, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this error is the per-account "role missing or untrusted" case
    pub fn is_authorization_denied(&self) -> bool {
        self.kind == ErrorKind::AuthorizationDenied
    }

    /// Check if a retry might succeed
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::Transport
    }
}
