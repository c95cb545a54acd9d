//! Login, invite acceptance and membership provisioning.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use nestsite_auth::{LoginInput, LoginOutput};
use nestsite_core::models::membership::{Membership, MembershipRole};
use nestsite_core::models::user::User;
use nestsite_service::user::Member;
use nestsite_service::{CreateUserInput, CreateUserOutput};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::deleted;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AcceptInviteRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: MembershipRole,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<LoginInput>,
) -> ApiResult<Json<LoginOutput>> {
    Ok(Json(state.auth.login(input).await?))
}

pub async fn accept_invite(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<AcceptInviteRequest>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.accept_invite(&req.token, &req.password).await?))
}

/// Create or reuse a user and add them to a tenant. The response carries
/// the raw invite token when the user still has to set a password.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiJson(input): ApiJson<CreateUserInput>,
) -> ApiResult<Json<CreateUserOutput>> {
    Ok(Json(state.users.create_user(&principal, input).await?))
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(tenant_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<Member>>> {
    Ok(Json(state.users.list_members(&principal, tenant_id).await?))
}

pub async fn change_role(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ChangeRoleRequest>,
) -> ApiResult<Json<Membership>> {
    Ok(Json(state.users.change_role(&principal, id, req.role).await?))
}

pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Value>> {
    state.users.remove_member(&principal, id).await?;
    Ok(deleted(id))
}
