//! Service API versions.
//!
//! Every operation of the hub is served by the same version, `2016-07`, which adds
//! PNS error details on top of `2015-01` while staying backward compatible.

/// Name of the query parameter carrying the version on every request.
pub(crate) const API_VERSION_PARAM: &str = "api-version";

/// Latest version of the service API.
pub const LATEST_API_VERSION: &str = "2016-07";

/// Previous version of the service API, kept for reference.
pub const LEGACY_API_VERSION: &str = "2015-01";

/// Version used when the client configuration does not set one.
pub const DEFAULT_API_VERSION: &str = LATEST_API_VERSION;

/// Returns the API version to use for the given operation.
///
/// All operations currently use [`LATEST_API_VERSION`].
pub fn api_version_for_operation(_operation: &str) -> &'static str {
    LATEST_API_VERSION
}
