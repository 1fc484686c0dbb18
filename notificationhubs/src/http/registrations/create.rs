use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::registrations::ATOM_ENTRY_CONTENT_TYPE;
use crate::http::Escape;

/// Request to create a registration, or to replace an existing one.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct CreateRegistrationRequest {
    /// Registration to replace. A new one is created when `None`.
    pub registration_id: Option<String>,
    /// Atom entry describing the registration.
    pub entry: String,
}

pub(crate) fn build(base_url: &str, client: &Client, req: &CreateRegistrationRequest) -> RequestBuilder {
    let builder = match &req.registration_id {
        Some(id) => client.put(format!("{}/registrations/{}", base_url, id.escape())),
        None => client.post(format!("{base_url}/registrations")),
    };
    builder
        .header(CONTENT_TYPE, ATOM_ENTRY_CONTENT_TYPE)
        .body(req.entry.clone())
}
