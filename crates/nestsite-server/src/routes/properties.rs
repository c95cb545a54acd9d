//! Property CRUD and theme selection.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use nestsite_core::models::property::{CreateProperty, Property, UpdateProperty};
use nestsite_core::models::theme::Theme;
use nestsite_core::repository::PaginatedResult;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::{PageQuery, deleted};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::state::AppState;

/// Body of `POST /tenants/{id}/properties`; the tenant comes from the path.
#[derive(Debug, Deserialize)]
pub struct NewProperty {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub check_in_time: Option<String>,
    #[serde(default)]
    pub check_out_time: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: String,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(tenant_id): ApiPath<Uuid>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Json<PaginatedResult<Property>>> {
    Ok(Json(
        state
            .properties
            .list(&principal, tenant_id, page.into())
            .await?,
    ))
}

/// New properties always start as drafts.
pub async fn create(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(tenant_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<NewProperty>,
) -> ApiResult<Json<Property>> {
    let input = CreateProperty {
        tenant_id,
        slug: body.slug,
        name: body.name,
        tagline: body.tagline,
        description: body.description,
        address: body.address,
        contact_email: body.contact_email,
        contact_phone: body.contact_phone,
        check_in_time: body.check_in_time,
        check_out_time: body.check_out_time,
        theme: body.theme,
        status: None,
        metadata: body.metadata,
    };
    Ok(Json(state.properties.create(&principal, input).await?))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Property>> {
    Ok(Json(state.properties.get(&principal, id).await?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateProperty>,
) -> ApiResult<Json<Property>> {
    Ok(Json(state.properties.update(&principal, id, input).await?))
}

/// The property-delete operation: children first, stored media
/// best-effort, then the property itself.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    state.properties.delete(&principal, id).await?;
    Ok(deleted(id))
}

pub async fn set_theme(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ThemeRequest>,
) -> ApiResult<Json<Property>> {
    Ok(Json(
        state.properties.set_theme(&principal, id, &req.theme).await?,
    ))
}

pub async fn themes() -> Json<Vec<&'static str>> {
    Json(Theme::ALL.iter().map(|t| t.as_str()).collect())
}
