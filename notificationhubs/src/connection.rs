use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use base64::prelude::*;
use ring::hmac;
use time::OffsetDateTime;
use url::{form_urlencoded, Url};

use token_source::{TokenSource, TokenSourceProvider};

use crate::http::error::{ErrorCode, NotificationHubError};
use crate::http::Escape;

const PARAM_ENDPOINT: &str = "Endpoint";
const PARAM_KEY_NAME: &str = "SharedAccessKeyName";
const PARAM_KEY: &str = "SharedAccessKey";

/// Default lifetime of the generated SAS tokens.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConnectionStringError {
    #[error("missing {0} in connection string")]
    Missing(&'static str),
    #[error("malformed connection string segment: {0}")]
    Malformed(String),
    #[error("invalid endpoint {0}: {1}")]
    InvalidEndpoint(String, url::ParseError),
}

impl From<ConnectionStringError> for NotificationHubError {
    fn from(err: ConnectionStringError) -> Self {
        NotificationHubError::with_cause(ErrorCode::InvalidConnectionString, "Invalid connection string", err)
    }
}

/// A namespace connection string such as
/// `Endpoint=sb://ns.servicebus.windows.net/;SharedAccessKeyName=DefaultFullSharedAccessSignature;SharedAccessKey=...`.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    /// Namespace endpoint, `https` scheme and no trailing slash.
    pub endpoint: String,
    pub shared_access_key_name: String,
    pub shared_access_key: String,
}

impl ConnectionString {
    /// URL of the hub named `hub_path` in this namespace.
    pub fn hub_url(&self, hub_path: &str) -> String {
        format!("{}/{}", self.endpoint, hub_path.escape())
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("endpoint", &self.endpoint)
            .field("shared_access_key_name", &self.shared_access_key_name)
            .field("shared_access_key", &"<redacted>")
            .finish()
    }
}

impl FromStr for ConnectionString {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut endpoint = None;
        let mut key_name = None;
        let mut key = None;
        for segment in s.split(';').map(str::trim).filter(|v| !v.is_empty()) {
            let (name, value) = segment
                .split_once('=')
                .ok_or_else(|| ConnectionStringError::Malformed(segment.to_string()))?;
            match name {
                PARAM_ENDPOINT => endpoint = Some(value),
                PARAM_KEY_NAME => key_name = Some(value),
                PARAM_KEY => key = Some(value),
                _ => {}
            }
        }
        let endpoint = endpoint
            .filter(|v| !v.is_empty())
            .ok_or(ConnectionStringError::Missing(PARAM_ENDPOINT))?;
        let key_name = key_name
            .filter(|v| !v.is_empty())
            .ok_or(ConnectionStringError::Missing(PARAM_KEY_NAME))?;
        let key = key.filter(|v| !v.is_empty()).ok_or(ConnectionStringError::Missing(PARAM_KEY))?;

        let endpoint = match endpoint.strip_prefix("sb://") {
            Some(rest) => format!("https://{rest}"),
            None => endpoint.to_string(),
        };
        let endpoint = endpoint.trim_end_matches('/').to_string();
        Url::parse(&endpoint).map_err(|e| ConnectionStringError::InvalidEndpoint(endpoint.clone(), e))?;

        Ok(Self {
            endpoint,
            shared_access_key_name: key_name.to_string(),
            shared_access_key: key.to_string(),
        })
    }
}

/// Issues Shared Access Signature tokens from a namespace key.
#[derive(Clone)]
pub struct SasTokenSource {
    resource_uri: String,
    key_name: String,
    key: hmac::Key,
    ttl: Duration,
}

impl fmt::Debug for SasTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SasTokenSource")
            .field("resource_uri", &self.resource_uri)
            .field("key_name", &self.key_name)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SasTokenSource {
    pub fn new(connection: &ConnectionString, ttl: Duration) -> Self {
        Self {
            resource_uri: connection.endpoint.to_lowercase(),
            key_name: connection.shared_access_key_name.clone(),
            key: hmac::Key::new(hmac::HMAC_SHA256, connection.shared_access_key.as_bytes()),
            ttl,
        }
    }

    /// Token valid from `now` until `now + ttl`.
    pub fn token_at(&self, now: OffsetDateTime) -> String {
        let expiry = (now.unix_timestamp() + self.ttl.as_secs() as i64).to_string();
        let encoded_uri: String = form_urlencoded::byte_serialize(self.resource_uri.as_bytes()).collect();
        let to_sign = format!("{encoded_uri}\n{expiry}");
        let signature = BASE64_STANDARD.encode(hmac::sign(&self.key, to_sign.as_bytes()).as_ref());
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("se", &expiry)
            .append_pair("sig", &signature)
            .append_pair("skn", &self.key_name)
            .append_pair("sr", &self.resource_uri)
            .finish();
        format!("SharedAccessSignature {query}")
    }
}

#[async_trait::async_trait]
impl TokenSource for SasTokenSource {
    async fn token(&self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.token_at(OffsetDateTime::now_utc()))
    }
}

#[derive(Clone, Debug)]
pub struct SasTokenSourceProvider {
    source: Arc<SasTokenSource>,
}

impl SasTokenSourceProvider {
    pub fn new(connection: &ConnectionString) -> Self {
        Self::with_ttl(connection, DEFAULT_TOKEN_TTL)
    }

    pub fn with_ttl(connection: &ConnectionString, ttl: Duration) -> Self {
        Self {
            source: Arc::new(SasTokenSource::new(connection, ttl)),
        }
    }
}

impl TokenSourceProvider for SasTokenSourceProvider {
    fn token_source(&self) -> Arc<dyn TokenSource> {
        self.source.clone()
    }
}
