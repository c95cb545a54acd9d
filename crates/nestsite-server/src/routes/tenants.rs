//! Tenant CRUD and the JSON import.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use nestsite_core::models::tenant::{Tenant, UpdateTenant};
use nestsite_core::repository::PaginatedResult;
use nestsite_service::{ImportPayload, ImportReport, NewTenant};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::{PageQuery, deleted};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ImportQuery {
    #[serde(default)]
    pub dry_run: bool,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Json<PaginatedResult<Tenant>>> {
    Ok(Json(
        state.tenants.list_visible(&principal, page.into()).await?,
    ))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiJson(input): ApiJson<NewTenant>,
) -> ApiResult<Json<Tenant>> {
    Ok(Json(state.tenants.create(&principal, input).await?))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Tenant>> {
    Ok(Json(state.tenants.get(&principal, id).await?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateTenant>,
) -> ApiResult<Json<Tenant>> {
    Ok(Json(state.tenants.update(&principal, id, input).await?))
}

/// Deletes the tenant with all of its properties and memberships.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    state.tenants.delete(&principal, id).await?;
    Ok(deleted(id))
}

pub async fn import(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(tenant_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<ImportQuery>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult<Json<ImportReport>> {
    let payload = ImportPayload::from_json(body)?;
    Ok(Json(
        state
            .imports
            .import(&principal, tenant_id, payload, query.dry_run)
            .await?,
    ))
}
