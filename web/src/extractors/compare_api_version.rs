use crate::extractors::RejectionType;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use log::*;
use semver::Version;
use service::config::ApiVersion;

/// Rejects requests whose `x-version` header is missing or names an API
/// version this server does not expose.
pub(crate) struct CompareApiVersion(pub Version);

#[async_trait]
impl<S> FromRequestParts<S> for CompareApiVersion
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(ApiVersion::field_name())
            .ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("Missing {} header", ApiVersion::field_name()),
                )
            })?;

        let version = header
            .to_str()
            .ok()
            .and_then(|value| Version::parse(value).ok())
            .ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("Malformed {} header", ApiVersion::field_name()),
                )
            })?;

        if ApiVersion::versions()
            .iter()
            .any(|supported| Version::parse(supported).is_ok_and(|v| v == version))
        {
            Ok(CompareApiVersion(version))
        } else {
            warn!("Rejecting request for unsupported API version {version}");
            Err((
                StatusCode::BAD_REQUEST,
                format!("Unsupported API version {version}"),
            ))
        }
    }
}
