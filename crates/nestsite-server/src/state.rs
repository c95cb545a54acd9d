//! Shared application state: configuration plus one instance of every
//! service, all backed by the same database client.

use std::sync::Arc;

use nestsite_auth::AuthService;
use nestsite_core::error::NestError;
use nestsite_core::repository::Repositories;
use nestsite_db::repository::SurrealUserRepository;
use nestsite_db::{DbError, DbManager, SurrealRepositories};
use nestsite_service::{
    CatalogService, DomainService, ImportService, LocalObjectStore, MediaService,
    PropertyService, SiteResolver, TenantService, UserService,
};
use surrealdb::engine::any::Any;
use thiserror::Error;
use tracing::info;

use crate::config::ServerConfig;

pub type Repos = SurrealRepositories<Any>;
pub type Store = LocalObjectStore;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database connection failed: {0}")]
    Connect(#[from] surrealdb::Error),

    #[error("migrations failed: {0}")]
    Migrate(#[from] DbError),

    #[error("bootstrap failed: {0}")]
    Bootstrap(#[from] NestError),

    #[error("cannot create media directory: {0}")]
    MediaDir(#[from] std::io::Error),
}

pub struct AppState {
    pub config: ServerConfig,
    pub repos: Arc<Repos>,
    pub auth: AuthService<SurrealUserRepository<Any>>,
    pub users: UserService<Repos>,
    pub tenants: TenantService<Repos, Store>,
    pub properties: PropertyService<Repos, Store>,
    pub domains: DomainService<Repos>,
    pub catalog: CatalogService<Repos>,
    pub media: MediaService<Repos, Store>,
    pub imports: ImportService<Repos>,
    pub sites: SiteResolver<Repos>,
}

impl AppState {
    /// Connect, migrate, bootstrap the configured agency admin and wire
    /// up the services.
    pub async fn new(config: ServerConfig) -> Result<Arc<Self>, StartupError> {
        let manager = DbManager::connect(&config.db).await?;
        nestsite_db::run_migrations(manager.client()).await?;

        tokio::fs::create_dir_all(&config.media_dir).await?;
        let store = Arc::new(LocalObjectStore::new(
            &config.media_dir,
            config.media_base_url.clone(),
        ));
        let repos = Arc::new(SurrealRepositories::new(manager.client().clone()));
        let auth_config = Arc::new(config.auth.clone());

        let users = UserService::new(repos.clone(), auth_config);
        if let Some(admin) = &config.bootstrap {
            users.bootstrap(admin).await?;
        }

        info!(
            media_dir = %config.media_dir.display(),
            base_domain = config.base_domain.as_deref().unwrap_or("-"),
            "Services initialized"
        );

        Ok(Arc::new(Self {
            auth: AuthService::new(repos.users().clone(), config.auth.clone()),
            users,
            tenants: TenantService::new(repos.clone(), store.clone()),
            properties: PropertyService::new(repos.clone(), store.clone()),
            domains: DomainService::new(repos.clone()),
            catalog: CatalogService::new(repos.clone()),
            media: MediaService::new(repos.clone(), store),
            imports: ImportService::new(repos.clone()),
            sites: SiteResolver::new(repos.clone(), config.base_domain.clone()),
            repos,
            config,
        }))
    }
}
