//! Mapping of SDK failures onto error kinds

use aws_sdk_organizations::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::error::Error;
use std::fmt::Debug;

use crate::error::{ErrorKind, ProviderError};

/// Converts any SDK error into a kind-tagged [`ProviderError`]
///
/// Service errors are tagged by their error code. Failures without a code
/// (credential resolution, dispatch, timeouts) are tagged by what they are,
/// except that an `AccessDenied` anywhere in the chain always wins: that is
/// how a refused `AssumeRole` surfaces from a lazily resolved credential.
pub(crate) fn classify<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();

    let kind = match err.code() {
        Some(code) => ErrorKind::from_code(code),
        None if message.contains("AccessDenied") => ErrorKind::AuthorizationDenied,
        None => kind_without_code(&err),
    };

    ProviderError::new(kind, message)
}

fn kind_without_code<E, R>(err: &SdkError<E, R>) -> ErrorKind {
    match err {
        SdkError::TimeoutError(_) | SdkError::ResponseError(_) => ErrorKind::Transport,
        SdkError::DispatchFailure(failure) if failure.is_io() || failure.is_timeout() => {
            ErrorKind::Transport
        }
        // Credential resolution failures are reported as dispatch failures
        SdkError::DispatchFailure(_) => ErrorKind::Authentication,
        SdkError::ConstructionFailure(_) => ErrorKind::Configuration,
        _ => ErrorKind::Service,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_organizations::error::ErrorMetadata;
    use aws_sdk_organizations::operation::list_accounts::ListAccountsError;
    use aws_sdk_organizations::types::error::AccessDeniedException;

    #[test]
    fn test_timeout_is_transport() {
        let err: SdkError<ListAccountsError, ()> =
            SdkError::timeout_error("operation timed out".to_string());
        assert_eq!(classify(err).kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_construction_failure_is_configuration() {
        let err: SdkError<ListAccountsError, ()> =
            SdkError::construction_failure("missing region".to_string());
        assert_eq!(classify(err).kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_access_denied_in_message_wins() {
        let err: SdkError<ListAccountsError, ()> = SdkError::construction_failure(
            "AccessDenied: not authorized to perform sts:AssumeRole".to_string(),
        );
        assert_eq!(classify(err).kind(), ErrorKind::AuthorizationDenied);
    }

    #[test]
    fn test_service_error_code() {
        let modeled = ListAccountsError::AccessDeniedException(
            AccessDeniedException::builder()
                .message("You don't have permissions")
                .meta(
                    ErrorMetadata::builder()
                        .code("AccessDeniedException")
                        .message("You don't have permissions")
                        .build(),
                )
                .build(),
        );
        let err: SdkError<ListAccountsError, ()> = SdkError::service_error(modeled, ());
        assert_eq!(classify(err).kind(), ErrorKind::AuthorizationDenied);
    }
}
