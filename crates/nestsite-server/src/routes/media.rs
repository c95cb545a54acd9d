//! Media assets: raw uploads into the object store and external URLs.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use nestsite_core::models::media::{MediaAsset, UpdateMediaAsset};
use nestsite_service::{NewExternalMedia, Upload};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::deleted;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::AppState;

/// Metadata for `POST /properties/{id}/media/upload`; the body is the
/// file itself.
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: String,
    #[serde(default)]
    pub room_id: Option<Uuid>,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub sort_order: u32,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(property_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<MediaAsset>>> {
    Ok(Json(state.media.list(&principal, property_id).await?))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(property_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<NewExternalMedia>,
) -> ApiResult<Json<MediaAsset>> {
    Ok(Json(
        state
            .media
            .register_external(&principal, property_id, input)
            .await?,
    ))
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(property_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<MediaAsset>> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::MalformedRequest("missing Content-Type header".into()))?
        .to_string();

    let upload = Upload {
        filename: query.filename,
        content_type,
        bytes: body.to_vec(),
        room_id: query.room_id,
        alt_text: query.alt_text,
        sort_order: query.sort_order,
    };
    Ok(Json(
        state.media.upload(&principal, property_id, upload).await?,
    ))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateMediaAsset>,
) -> ApiResult<Json<MediaAsset>> {
    Ok(Json(state.media.update(&principal, id, input).await?))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    state.media.delete(&principal, id).await?;
    Ok(deleted(id))
}
