// Authenticated-identity seam. Session issuance and verification live with
// the external auth layer, which forwards the principal's id in the
// x-viewer-id header; this extractor is the only place that reads it.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

pub const VIEWER_HEADER: &str = "x-viewer-id";

/// The requesting principal (a user or a partner account).
#[derive(Debug, Clone, Copy)]
pub struct Viewer(pub Uuid);

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let viewer = parts
            .headers
            .get(VIEWER_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Missing credentials".to_string()))
            .and_then(|value| {
                value
                    .to_str()
                    .ok()
                    .and_then(|raw| Uuid::parse_str(raw).ok())
                    .map(Viewer)
                    .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))
            });

        async move { viewer }
    }
}
