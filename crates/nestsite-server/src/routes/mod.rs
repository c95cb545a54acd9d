//! HTTP routes.
//!
//! Everything under `/api` except login and invite acceptance requires a
//! bearer token. `/site` serves the public payload for the request host
//! and `/media` the files of the local object store.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, patch, post, put};
use nestsite_core::repository::Pagination;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;
use uuid::Uuid;

use crate::state::AppState;

mod auth;
mod catalog;
mod domains;
mod media;
mod properties;
mod site;
mod tenants;

const MAX_PAGE_SIZE: u64 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    offset: Option<u64>,
    limit: Option<u64>,
}

impl From<PageQuery> for Pagination {
    fn from(q: PageQuery) -> Self {
        let defaults = Pagination::default();
        Pagination {
            offset: q.offset.unwrap_or(defaults.offset),
            limit: q.limit.unwrap_or(defaults.limit).clamp(1, MAX_PAGE_SIZE),
        }
    }
}

pub(crate) fn deleted(id: Uuid) -> axum::Json<Value> {
    axum::Json(json!({ "deleted": id }))
}

async fn healthz() -> axum::Json<Value> {
    axum::Json(json!({ "status": "ok" }))
}

fn cors(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    if origins.is_empty() {
        return layer.allow_origin(AllowOrigin::any());
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| {
            HeaderValue::from_str(o)
                .map_err(|e| warn!(origin = %o, error = %e, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();
    layer.allow_origin(allowed)
}

fn api(state: &AppState) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/accept-invite", post(auth::accept_invite))
        .route("/users", post(auth::create_user))
        .route("/tenants", get(tenants::list).post(tenants::create))
        .route(
            "/tenants/{id}",
            get(tenants::get).patch(tenants::update).delete(tenants::delete),
        )
        .route("/tenants/{id}/members", get(auth::list_members))
        .route(
            "/memberships/{id}",
            patch(auth::change_role).delete(auth::remove_member),
        )
        .route(
            "/tenants/{id}/properties",
            get(properties::list).post(properties::create),
        )
        .route("/tenants/{id}/import", post(tenants::import))
        .route(
            "/properties/{id}",
            get(properties::get)
                .patch(properties::update)
                .delete(properties::delete),
        )
        .route("/properties/{id}/theme", put(properties::set_theme))
        .route("/themes", get(properties::themes))
        .route(
            "/properties/{id}/domains",
            get(domains::list).post(domains::add),
        )
        .route("/domains/{id}/primary", post(domains::set_primary))
        .route("/domains/{id}", delete(domains::remove))
        .route(
            "/properties/{id}/rooms",
            get(catalog::list_rooms).post(catalog::add_room),
        )
        .route(
            "/rooms/{id}",
            patch(catalog::update_room).delete(catalog::delete_room),
        )
        .route(
            "/properties/{id}/hosts",
            get(catalog::list_hosts).post(catalog::add_host),
        )
        .route(
            "/hosts/{id}",
            patch(catalog::update_host).delete(catalog::delete_host),
        )
        .route(
            "/properties/{id}/pricing",
            get(catalog::list_pricing).post(catalog::add_pricing),
        )
        .route(
            "/pricing/{id}",
            patch(catalog::update_pricing).delete(catalog::delete_pricing),
        )
        .route(
            "/properties/{id}/media",
            get(media::list).post(media::register),
        )
        .route(
            "/properties/{id}/media/upload",
            post(media::upload).layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/media/{id}", patch(media::update).delete(media::remove))
        .route("/properties/{id}/content", get(catalog::list_content))
        .route(
            "/properties/{id}/content/{key}",
            put(catalog::put_content).delete(catalog::delete_content),
        )
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/site", get(site::public_site))
        .nest("/api", api(&state))
        .nest_service("/media", ServeDir::new(&state.config.media_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors(&state.config.cors_origins))
        .with_state(state)
}
