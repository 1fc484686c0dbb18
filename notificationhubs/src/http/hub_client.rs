use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use token_source::TokenSource;

use crate::api_version::{api_version_for_operation, API_VERSION_PARAM};
use crate::http::error::ValidationError;
use crate::http::registrations::create::CreateRegistrationRequest;
use crate::http::registrations::delete::DeleteRegistrationRequest;
use crate::http::registrations::get::GetRegistrationRequest;
use crate::http::registrations::list::{ListRegistrationsRequest, CONTINUATION_TOKEN_HEADER};
use crate::http::registrations::{
    create, delete, get, list, update_target, RegisteredDevice, Registration, RegistrationResult, Registrations,
    TemplateRegistration,
};
use crate::http::{check_response_status, Error};

const USER_AGENT_VALUE: &str = concat!("notification-hubs-rust/", env!("CARGO_PKG_VERSION"));
const REGISTRATION_OPERATION: &str = "registration";

/// Talks to the registration endpoints of one hub.
#[derive(Clone, Debug)]
pub struct HubClient {
    ts: Option<Arc<dyn TokenSource>>,
    v1_endpoint: String,
    api_version: Option<String>,
    http: Client,
}

impl HubClient {
    pub(crate) fn new(
        ts: Option<Arc<dyn TokenSource>>,
        endpoint: &str,
        api_version: Option<String>,
        http: Client,
    ) -> Self {
        Self {
            ts,
            v1_endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version,
            http,
        }
    }

    /// Reads one registration.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn registration(&self, req: &GetRegistrationRequest) -> Result<RegistrationResult, Error> {
        require_registration_id(&req.registration_id)?;
        let builder = get::build(self.v1_endpoint.as_str(), &self.http, req);
        let (text, _) = self.send(builder).await?;
        let mut result = RegistrationResult::from_xml(&text)?;
        result.normalize()?;
        Ok(result)
    }

    /// Lists one page of registrations.
    ///
    /// Pass the returned `continuation_token` back in the request to read the next page.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn registrations(&self, req: &ListRegistrationsRequest) -> Result<Registrations, Error> {
        if let Some(tag) = &req.tag {
            if tag.is_empty() {
                return Err(ValidationError::new("tag", "must not be empty", tag).into());
            }
        }
        let builder = list::build(self.v1_endpoint.as_str(), &self.http, req);
        let (text, continuation_token) = self.send(builder).await?;
        let mut registrations = Registrations::from_xml(&text)?;
        registrations.normalize()?;
        registrations.continuation_token = continuation_token;
        Ok(registrations)
    }

    /// Creates the registration, or replaces it when its registration id is set.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn register(&self, registration: &Registration) -> Result<RegistrationResult, Error> {
        registration.validate()?;
        let req = CreateRegistrationRequest {
            registration_id: update_target(&registration.registration_id).map(str::to_string),
            entry: registration.to_xml()?,
        };
        self.create(&req).await
    }

    /// Creates the template registration, or replaces it when its registration id is set.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn register_with_template(&self, registration: &TemplateRegistration) -> Result<RegistrationResult, Error> {
        registration.validate()?;
        let req = CreateRegistrationRequest {
            registration_id: update_target(&registration.registration_id).map(str::to_string),
            entry: registration.to_xml()?,
        };
        self.create(&req).await
    }

    /// Deletes the registration of `device`, provided it was not changed since it was read.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn unregister(&self, device: &RegisteredDevice) -> Result<(), Error> {
        let req = DeleteRegistrationRequest {
            registration_id: device.registration_id.clone(),
            etag: device.etag.clone(),
        };
        self.delete_registration(&req).await
    }

    /// Deletes a registration.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn delete_registration(&self, req: &DeleteRegistrationRequest) -> Result<(), Error> {
        require_registration_id(&req.registration_id)?;
        let builder = delete::build(self.v1_endpoint.as_str(), &self.http, req);
        self.send(builder).await.map(|_| ())
    }

    async fn create(&self, req: &CreateRegistrationRequest) -> Result<RegistrationResult, Error> {
        tracing::trace!("registration entry={}", req.entry);
        let builder = create::build(self.v1_endpoint.as_str(), &self.http, req);
        let (text, _) = self.send(builder).await?;
        let mut result = RegistrationResult::from_xml(&text)?;
        result.normalize()?;
        Ok(result)
    }

    async fn with_headers(&self, builder: RequestBuilder) -> Result<RequestBuilder, Error> {
        let api_version = self
            .api_version
            .as_deref()
            .unwrap_or_else(|| api_version_for_operation(REGISTRATION_OPERATION));
        let builder = builder
            .query(&[(API_VERSION_PARAM, api_version)])
            .header(USER_AGENT, USER_AGENT_VALUE);
        match &self.ts {
            Some(ts) => {
                let token = ts.token().await.map_err(Error::TokenSource)?;
                Ok(builder.header(AUTHORIZATION, token))
            }
            None => Ok(builder),
        }
    }

    /// Sends the request and returns the response body with its continuation token, if any.
    async fn send(&self, builder: RequestBuilder) -> Result<(String, Option<String>), Error> {
        let builder = self.with_headers(builder).await?;
        let response = builder.send().await?;
        let response = check_response_status(response).await?;
        let continuation_token = response
            .headers()
            .get(CONTINUATION_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let text = response.text().await?;
        tracing::trace!("response={}", text);
        Ok((text, continuation_token))
    }
}

fn require_registration_id(registration_id: &str) -> Result<(), Error> {
    if registration_id.trim().is_empty() {
        return Err(ValidationError::new("registration_id", "must not be empty", registration_id).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use reqwest_middleware::ClientBuilder;
    use token_source::{StaticTokenSourceProvider, TokenSourceProvider};

    use super::*;
    use crate::format::NotificationFormat;

    #[ctor::ctor]
    fn init() {
        let _ = tracing_subscriber::fmt::try_init();
    }

    fn client() -> HubClient {
        let ts = StaticTokenSourceProvider::new("SharedAccessSignature sr=x").token_source();
        HubClient::new(
            Some(ts),
            "http://127.0.0.1:1/hub/",
            None,
            ClientBuilder::new(reqwest::Client::new()).build(),
        )
    }

    #[test]
    fn test_endpoint_is_trimmed() {
        assert_eq!("http://127.0.0.1:1/hub", client().v1_endpoint);
    }

    #[tokio::test]
    async fn test_with_headers() {
        let client = client();
        let builder = client
            .with_headers(client.http.get("http://127.0.0.1:1/hub/registrations"))
            .await
            .unwrap();
        let request = builder.build().unwrap();
        assert_eq!(Some("api-version=2016-07"), request.url().query());
        assert_eq!("SharedAccessSignature sr=x", request.headers()[AUTHORIZATION]);
        assert!(request.headers()[USER_AGENT]
            .to_str()
            .unwrap()
            .starts_with("notification-hubs-rust/"));
    }

    #[tokio::test]
    async fn test_validation_before_request() {
        let client = client();
        let err = client
            .registration(&GetRegistrationRequest::default())
            .await
            .unwrap_err();
        match &err {
            Error::Validation(e) => {
                let e = e.downcast_ref::<ValidationError>().unwrap();
                assert_eq!("registration_id", e.field);
            }
            other => panic!("unexpected {other:?}"),
        }

        let err = client.unregister(&RegisteredDevice::default()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = client
            .register(&Registration::new(" ", NotificationFormat::Apple))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = client
            .registrations(&ListRegistrationsRequest {
                tag: Some(String::new()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
