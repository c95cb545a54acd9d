use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use nestsite_core::models::domain::Domain;
use nestsite_service::AddDomain;
use serde_json::Value;
use uuid::Uuid;

use super::deleted;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(property_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<Domain>>> {
    Ok(Json(state.domains.list(&principal, property_id).await?))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(property_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<AddDomain>,
) -> ApiResult<Json<Domain>> {
    Ok(Json(state.domains.add(&principal, property_id, input).await?))
}

pub async fn set_primary(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Domain>> {
    Ok(Json(state.domains.set_primary(&principal, id).await?))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    state.domains.delete(&principal, id).await?;
    Ok(deleted(id))
}
