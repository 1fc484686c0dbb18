use std::ops::Deref;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};

use token_source::TokenSourceProvider;

use crate::connection::{ConnectionString, SasTokenSourceProvider};
use crate::http::error::{NotificationHubError, ValidationError};
use crate::http::hub_client::HubClient;
use crate::http::Error;

/// Environment variable read by [`ClientConfig::with_env`] for the connection string.
pub const CONNECTION_STRING_ENV: &str = "NOTIFICATION_HUB_CONNECTION_STRING";
/// Environment variable read by [`ClientConfig::with_env`] for the hub path.
pub const HUB_PATH_ENV: &str = "NOTIFICATION_HUB_PATH";

#[derive(Debug, Default)]
pub struct ClientConfig {
    /// HTTP client to send requests with, a plain one is created when `None`.
    pub http: Option<ClientWithMiddleware>,
    pub connection_string: Option<String>,
    /// Name of the hub inside the namespace.
    pub hub_path: String,
    /// Overrides the API version of every operation.
    pub api_version: Option<String>,
    /// Overrides the SAS tokens derived from the connection string.
    pub token_source_provider: Option<Box<dyn TokenSourceProvider>>,
}

impl ClientConfig {
    pub fn with_connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = Some(connection_string.into());
        self
    }

    pub fn with_hub_path(mut self, hub_path: impl Into<String>) -> Self {
        self.hub_path = hub_path.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn with_http(mut self, http: ClientWithMiddleware) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_token_source_provider(mut self, provider: impl TokenSourceProvider + 'static) -> Self {
        self.token_source_provider = Some(Box::new(provider));
        self
    }

    /// Fills the connection string and hub path from the environment, when set there.
    pub fn with_env(mut self) -> Self {
        if let Ok(v) = std::env::var(CONNECTION_STRING_ENV) {
            self.connection_string = Some(v);
        }
        if let Ok(v) = std::env::var(HUB_PATH_ENV) {
            self.hub_path = v;
        }
        self
    }
}

#[derive(Clone, Debug)]
pub struct Client {
    hub_client: HubClient,
}

impl Deref for Client {
    type Target = HubClient;

    fn deref(&self) -> &Self::Target {
        &self.hub_client
    }
}

impl Client {
    /// New client
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let connection: ConnectionString = config
            .connection_string
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(NotificationHubError::from)?;
        let hub_path = config.hub_path.trim_matches('/');
        if hub_path.is_empty() {
            return Err(ValidationError::new("hub_path", "must not be empty", &config.hub_path).into());
        }
        let ts = match config.token_source_provider {
            Some(tsp) => tsp.token_source(),
            None => SasTokenSourceProvider::new(&connection).token_source(),
        };
        let http = config
            .http
            .unwrap_or_else(|| ClientBuilder::new(reqwest::Client::default()).build());
        tracing::trace!("hub endpoint={}", connection.hub_url(hub_path));
        Ok(Self {
            hub_client: HubClient::new(Some(ts), &connection.hub_url(hub_path), config.api_version, http),
        })
    }
}
