use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::Escape;

/// Request to read one registration.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct GetRegistrationRequest {
    /// Required. Identifier the hub assigned to the registration.
    pub registration_id: String,
}

pub(crate) fn build(base_url: &str, client: &Client, req: &GetRegistrationRequest) -> RequestBuilder {
    let url = format!("{}/registrations/{}", base_url, req.registration_id.escape());
    client.get(url)
}
