use std::error::Error;
use std::fmt;

use reqwest::header::HeaderMap;

/// Header carrying the identifier the service assigned to a request.
pub const REQUEST_ID_HEADER: &str = "x-ms-request-id";

type BoxError = Box<dyn Error + Send + Sync>;

/// Stable code identifying the kind of a [`NotificationHubError`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // connection and authentication
    InvalidConnectionString,
    AuthenticationFailed,
    Unauthorized,

    // request
    InvalidRequest,
    InvalidPayload,
    PayloadTooLarge,
    InvalidTags,

    // server side
    ServerError,
    ServiceUnavailable,
    Timeout,

    // throttling
    RateLimited,
    QuotaExceeded,

    // resources
    RegistrationNotFound,
    InvalidRegistration,
    InstallationNotFound,
    InvalidInstallation,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidConnectionString => "INVALID_CONNECTION_STRING",
            ErrorCode::AuthenticationFailed => "AUTHENTICATION_FAILED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::InvalidPayload => "INVALID_PAYLOAD",
            ErrorCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorCode::InvalidTags => "INVALID_TAGS",
            ErrorCode::ServerError => "SERVER_ERROR",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::QuotaExceeded => "QUOTA_EXCEEDED",
            ErrorCode::RegistrationNotFound => "REGISTRATION_NOT_FOUND",
            ErrorCode::InvalidRegistration => "INVALID_REGISTRATION",
            ErrorCode::InstallationNotFound => "INSTALLATION_NOT_FOUND",
            ErrorCode::InvalidInstallation => "INVALID_INSTALLATION",
        }
    }

    /// Returns `true` if re-issuing the same request may succeed.
    ///
    /// `RateLimited` is only worth retrying after a backoff; the caller owns that policy.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::ServerError | ErrorCode::ServiceUnavailable | ErrorCode::Timeout | ErrorCode::RateLimited
        )
    }

    /// Returns `true` if the credentials need to be derived again before retrying.
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::InvalidConnectionString | ErrorCode::AuthenticationFailed | ErrorCode::Unauthorized
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error reported by the notification hub service, or raised while talking to it.
///
/// Two errors are equal when their codes are equal, whatever their messages, details or causes.
#[derive(Debug)]
pub struct NotificationHubError {
    pub code: ErrorCode,
    /// Short human readable description.
    pub message: String,
    /// Raw response body, when the service returned one.
    pub details: Option<String>,
    /// HTTP status of the response this error was classified from.
    pub status_code: Option<u16>,
    /// Value of the `x-ms-request-id` response header.
    pub request_id: Option<String>,
    pub cause: Option<BoxError>,
}

impl NotificationHubError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            status_code: None,
            request_id: None,
            cause: None,
        }
    }

    pub fn with_cause(code: ErrorCode, message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            cause: Some(cause.into()),
            ..Self::new(code, message)
        }
    }

    /// Classifies a failed HTTP exchange.
    pub fn from_response(status: u16, headers: &HeaderMap, body: &[u8]) -> Self {
        let (code, message) = match status {
            400 => (ErrorCode::InvalidRequest, "Bad request".to_string()),
            401 => (ErrorCode::Unauthorized, "Unauthorized".to_string()),
            403 => (ErrorCode::AuthenticationFailed, "Authentication failed".to_string()),
            404 => (ErrorCode::RegistrationNotFound, "Resource not found".to_string()),
            413 => (ErrorCode::PayloadTooLarge, "Payload too large".to_string()),
            429 => (ErrorCode::RateLimited, "Rate limited".to_string()),
            500 => (ErrorCode::ServerError, "Internal server error".to_string()),
            503 => (ErrorCode::ServiceUnavailable, "Service unavailable".to_string()),
            504 => (ErrorCode::Timeout, "Gateway timeout".to_string()),
            _ => (ErrorCode::ServerError, format!("HTTP {status}")),
        };
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let details = if body.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(body).into_owned())
        };
        Self {
            code,
            message,
            details,
            status_code: Some(status),
            request_id,
            cause: None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    pub fn is_authentication_error(&self) -> bool {
        self.code.is_authentication_error()
    }
}

impl fmt::Display for NotificationHubError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "notification hub error [{}]: {}", self.code, self.message)?;
        match &self.details {
            Some(details) => write!(f, " - {details}"),
            None => Ok(()),
        }
    }
}

impl Error for NotificationHubError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_ref().map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

impl PartialEq for NotificationHubError {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl PartialEq<ErrorCode> for NotificationHubError {
    fn eq(&self, other: &ErrorCode) -> bool {
        self.code == *other
    }
}

/// A local precondition failure, detected before any request is sent.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub value: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "validation error for field '{}': {} (value: {})",
            self.field, self.message, self.value
        )
    }
}

impl Error for ValidationError {}

/// Collects errors so that all of them can be reported at once.
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<BoxError>,
}

impl MultiError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, err: impl Into<BoxError>) {
        self.errors.push(err.into());
    }

    /// Keeps the error of `result`, if any, and hands back the success value.
    pub fn add_result<T, E: Into<BoxError>>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.add(e);
                None
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[BoxError] {
        &self.errors
    }

    /// Converts the collected errors into a single one.
    ///
    /// Returns `None` when nothing was collected and the error itself when exactly one was.
    pub fn into_error(mut self) -> Option<BoxError> {
        match self.errors.len() {
            0 => None,
            1 => self.errors.pop(),
            _ => Some(Box::new(self)),
        }
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.errors.as_slice() {
            [single] => write!(f, "{single}"),
            errors => write!(f, "multiple errors occurred ({} errors)", errors.len()),
        }
    }
}

impl Error for MultiError {}
