use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::HOST;
use nestsite_service::PublicSite;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const FORWARDED_HOST: &str = "x-forwarded-host";

/// The host the visitor asked for. A proxy's `X-Forwarded-Host` wins over
/// `Host`; only the first forwarded value counts.
fn request_host(headers: &HeaderMap) -> Option<String> {
    headers
        .get(FORWARDED_HOST)
        .or_else(|| headers.get(HOST))
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Public payload of the published property behind the request host.
pub async fn public_site(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<PublicSite>> {
    let host = request_host(&headers)
        .ok_or_else(|| ApiError::MalformedRequest("missing Host header".into()))?;
    Ok(Json(state.sites.load(&host).await?))
}
