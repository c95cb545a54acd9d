//! Rooms, hosts, pricing rules and content blocks of a property.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use nestsite_core::models::content::ContentBlock;
use nestsite_core::models::host::{Host, UpdateHost};
use nestsite_core::models::pricing::{PricingRule, UpdatePricingRule};
use nestsite_core::models::room::{Room, UpdateRoom};
use nestsite_service::{NewHost, NewPricingRule, NewRoom};
use serde_json::{Value, json};
use uuid::Uuid;

use super::deleted;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

// -- rooms -------------------------------------------------------------------

pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(property_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<Room>>> {
    Ok(Json(state.catalog.list_rooms(&principal, property_id).await?))
}

pub async fn add_room(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(property_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<NewRoom>,
) -> ApiResult<Json<Room>> {
    Ok(Json(
        state.catalog.add_room(&principal, property_id, input).await?,
    ))
}

pub async fn update_room(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateRoom>,
) -> ApiResult<Json<Room>> {
    Ok(Json(state.catalog.update_room(&principal, id, input).await?))
}

pub async fn delete_room(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    state.catalog.delete_room(&principal, id).await?;
    Ok(deleted(id))
}

// -- hosts -------------------------------------------------------------------

pub async fn list_hosts(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(property_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<Host>>> {
    Ok(Json(state.catalog.list_hosts(&principal, property_id).await?))
}

pub async fn add_host(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(property_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<NewHost>,
) -> ApiResult<Json<Host>> {
    Ok(Json(
        state.catalog.add_host(&principal, property_id, input).await?,
    ))
}

pub async fn update_host(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateHost>,
) -> ApiResult<Json<Host>> {
    Ok(Json(state.catalog.update_host(&principal, id, input).await?))
}

pub async fn delete_host(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    state.catalog.delete_host(&principal, id).await?;
    Ok(deleted(id))
}

// -- pricing -----------------------------------------------------------------

pub async fn list_pricing(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(property_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<PricingRule>>> {
    Ok(Json(
        state.catalog.list_pricing(&principal, property_id).await?,
    ))
}

pub async fn add_pricing(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(property_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<NewPricingRule>,
) -> ApiResult<Json<PricingRule>> {
    Ok(Json(
        state
            .catalog
            .add_pricing(&principal, property_id, input)
            .await?,
    ))
}

pub async fn update_pricing(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdatePricingRule>,
) -> ApiResult<Json<PricingRule>> {
    Ok(Json(
        state.catalog.update_pricing(&principal, id, input).await?,
    ))
}

pub async fn delete_pricing(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    state.catalog.delete_pricing(&principal, id).await?;
    Ok(deleted(id))
}

// -- content -----------------------------------------------------------------

pub async fn list_content(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(property_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<ContentBlock>>> {
    Ok(Json(
        state.catalog.list_content(&principal, property_id).await?,
    ))
}

/// The body is stored verbatim as the block's value.
pub async fn put_content(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath((property_id, key)): ApiPath<(Uuid, String)>,
    ApiJson(value): ApiJson<Value>,
) -> ApiResult<Json<ContentBlock>> {
    Ok(Json(
        state
            .catalog
            .put_content(&principal, property_id, &key, value)
            .await?,
    ))
}

pub async fn delete_content(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath((property_id, key)): ApiPath<(Uuid, String)>,
) -> ApiResult<Json<Value>> {
    state
        .catalog
        .delete_content(&principal, property_id, &key)
        .await?;
    Ok(Json(json!({ "deleted": key })))
}
