use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Response;

use crate::http::error::{ErrorCode, MultiError, NotificationHubError, ValidationError};

pub mod error;
pub mod hub_client;
pub mod registrations;
pub(crate) mod xml;

pub use xml::DecodeError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An error returned from the notification hub service.
    #[error(transparent)]
    Hub(#[from] NotificationHubError),

    /// An error from the underlying HTTP client.
    #[error(transparent)]
    HttpClient(#[from] reqwest::Error),

    /// An error from one of the middleware used.
    #[error(transparent)]
    HttpMiddleware(anyhow::Error),

    /// An error from a token source.
    #[error("token source failed: {0}")]
    TokenSource(Box<dyn std::error::Error + Send + Sync>),

    /// The response body could not be read as a registration.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The request was rejected locally, before being sent.
    #[error("{0}")]
    Validation(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Code of the classified service error, if this is one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::Hub(e) => Some(e.code),
            _ => None,
        }
    }

    /// Returns `true` if re-issuing the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Hub(e) => e.is_retryable(),
            Error::HttpClient(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Hub(e) => e.is_authentication_error(),
            Error::TokenSource(_) => true,
            _ => false,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(error: reqwest_middleware::Error) -> Self {
        match error {
            reqwest_middleware::Error::Middleware(err) => Error::HttpMiddleware(err),
            reqwest_middleware::Error::Reqwest(err) => Error::HttpClient(err),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Self {
        Error::Validation(Box::new(error))
    }
}

impl From<MultiError> for Error {
    fn from(errors: MultiError) -> Self {
        match errors.into_error() {
            Some(err) => Error::Validation(err),
            None => Error::Validation(Box::new(MultiError::new())),
        }
    }
}

/// Checks whether an HTTP response is successful and returns it, or returns the classified error.
pub(crate) async fn check_response_status(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let status = status.as_u16();
    let headers = response.headers().clone();
    let error = match response.bytes().await {
        Ok(body) => NotificationHubError::from_response(status, &headers, &body),
        Err(err) => {
            let mut error = NotificationHubError::from_response(status, &headers, b"");
            error.cause = Some(Box::new(err));
            error
        }
    };
    tracing::debug!(
        status,
        code = error.code.as_str(),
        request_id = error.request_id.as_deref().unwrap_or_default(),
        "request failed"
    );
    Err(error.into())
}

pub(crate) trait Escape {
    fn escape(&self) -> String;
}

impl Escape for str {
    fn escape(&self) -> String {
        utf8_percent_encode(self, ENCODE_SET).to_string()
    }
}

const ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'*').remove(b'-').remove(b'.').remove(b'_');

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!("abc-1.2_3", "abc-1.2_3".escape());
        assert_eq!("a%2Fb%20c%3Fd", "a/b c?d".escape());
        assert_eq!("tag%3Auser%40x", "tag:user@x".escape());
    }

    #[test]
    fn test_error_verdicts() {
        let err: Error = NotificationHubError::new(ErrorCode::ServiceUnavailable, "Service unavailable").into();
        assert_eq!(Some(ErrorCode::ServiceUnavailable), err.code());
        assert!(err.is_retryable());
        assert!(!err.is_authentication_error());

        let err: Error = NotificationHubError::new(ErrorCode::Unauthorized, "Unauthorized").into();
        assert!(err.is_authentication_error());
        assert!(!err.is_retryable());

        let err = Error::TokenSource("expired".into());
        assert_eq!("token source failed: expired", err.to_string());
        assert!(err.is_authentication_error());
        assert_eq!(None, err.code());

        let err: Error = ValidationError::new("registration_id", "must not be empty", "").into();
        assert!(!err.is_retryable());
        assert_eq!(
            "validation error for field 'registration_id': must not be empty (value: )",
            err.to_string()
        );
    }

    #[test]
    fn test_multi_error_conversion() {
        let mut errors = MultiError::new();
        errors.add(ValidationError::new("device_id", "must not be empty", ""));
        errors.add(ValidationError::new("tags", "tag contains an invalid character", "a b"));
        let err: Error = errors.into();
        assert_eq!("multiple errors occurred (2 errors)", err.to_string());
    }
}
