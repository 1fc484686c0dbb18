use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::Escape;

/// Response header carrying the token of the next page.
pub(crate) const CONTINUATION_TOKEN_HEADER: &str = "x-ms-continuationtoken";

/// Request to list registrations, optionally only those carrying a tag.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
pub struct ListRegistrationsRequest {
    /// Lists only the registrations carrying this tag.
    #[serde(skip_serializing)]
    pub tag: Option<String>,
    /// Maximum number of entries in the page.
    #[serde(rename = "$top", skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    /// Token returned with the previous page.
    #[serde(rename = "ContinuationToken", skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

pub(crate) fn build(base_url: &str, client: &Client, req: &ListRegistrationsRequest) -> RequestBuilder {
    let url = match &req.tag {
        Some(tag) => format!("{}/tags/{}/registrations", base_url, tag.escape()),
        None => format!("{base_url}/registrations"),
    };
    client.get(url).query(&req)
}
