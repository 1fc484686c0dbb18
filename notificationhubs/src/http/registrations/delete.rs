use reqwest::header::IF_MATCH;
use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::Escape;

/// Request to delete one registration.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct DeleteRegistrationRequest {
    /// Required. Identifier the hub assigned to the registration.
    pub registration_id: String,
    /// ETag the registration was read with. When empty the registration is deleted whatever its version.
    pub etag: String,
}

pub(crate) fn build(base_url: &str, client: &Client, req: &DeleteRegistrationRequest) -> RequestBuilder {
    let url = format!("{}/registrations/{}", base_url, req.registration_id.escape());
    let etag = if req.etag.is_empty() { "*" } else { req.etag.as_str() };
    client.delete(url).header(IF_MATCH, etag)
}
