//! Server configuration from `NESTSITE_*` environment variables.
//!
//! Every setting has a default except the JWT key pair, which must be
//! given either inline (`NESTSITE_JWT_PRIVATE_KEY`) or as a file path
//! (`NESTSITE_JWT_PRIVATE_KEY_PATH`), and likewise for the public key.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use nestsite_auth::AuthConfig;
use nestsite_db::DbConfig;
use nestsite_service::user::BootstrapAdmin;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is required")]
    Missing { key: String },

    #[error("invalid {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub db: DbConfig,
    pub auth: AuthConfig,
    /// Platform domain for `{property}.{tenant}.{base_domain}` sites.
    pub base_domain: Option<String>,
    pub media_dir: PathBuf,
    pub media_base_url: String,
    pub max_upload_bytes: usize,
    /// Allowed CORS origins; empty allows any origin.
    pub cors_origins: Vec<String>,
    pub bootstrap: Option<BootstrapAdmin>,
}

/// Reads settings through a lookup function so tests can feed a map
/// instead of the process environment.
struct Source<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Source<F> {
    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn try_load<T: FromStr>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T::Err: Display,
    {
        let raw = self.var(key).unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        });
        raw.parse().map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key: key.into(),
                message: e.to_string(),
            }
        })
    }

    /// Inline value of `key`, else the contents of the file named by
    /// `{key}_PATH`.
    fn secret(&self, key: &str) -> Result<String, ConfigError> {
        if let Some(value) = self.var(key) {
            return Ok(value.replace("\\n", "\n"));
        }
        let path_key = format!("{key}_PATH");
        let path = self
            .var(&path_key)
            .ok_or_else(|| ConfigError::Missing { key: key.into() })?;
        std::fs::read_to_string(&path)
            .map(|s| s.trim().to_string())
            .map_err(|source| ConfigError::Read { path, source })
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let src = Source { lookup };
        let db_defaults = DbConfig::default();
        let auth_defaults = AuthConfig::default();

        let db = DbConfig {
            url: src.try_load("NESTSITE_DB_URL", &db_defaults.url)?,
            namespace: src.try_load("NESTSITE_DB_NAMESPACE", &db_defaults.namespace)?,
            database: src.try_load("NESTSITE_DB_DATABASE", &db_defaults.database)?,
            username: src.var("NESTSITE_DB_USER").or(db_defaults.username),
            password: src.var("NESTSITE_DB_PASSWORD").or(db_defaults.password),
        };

        let auth = AuthConfig {
            jwt_private_key_pem: src.secret("NESTSITE_JWT_PRIVATE_KEY")?,
            jwt_public_key_pem: src.secret("NESTSITE_JWT_PUBLIC_KEY")?,
            access_token_lifetime_secs: src.try_load(
                "NESTSITE_ACCESS_TOKEN_TTL_SECS",
                &auth_defaults.access_token_lifetime_secs.to_string(),
            )?,
            jwt_issuer: src.try_load("NESTSITE_JWT_ISSUER", &auth_defaults.jwt_issuer)?,
            pepper: src.var("NESTSITE_PASSWORD_PEPPER"),
            min_password_length: src.try_load(
                "NESTSITE_MIN_PASSWORD_LENGTH",
                &auth_defaults.min_password_length.to_string(),
            )?,
        };

        let bootstrap = match src.var("NESTSITE_BOOTSTRAP_ADMIN_EMAIL") {
            Some(email) => Some(BootstrapAdmin {
                agency_name: src.try_load("NESTSITE_BOOTSTRAP_AGENCY_NAME", "NestSite Agency")?,
                agency_slug: src.try_load("NESTSITE_BOOTSTRAP_AGENCY_SLUG", "nestsite")?,
                email,
                password: src.var("NESTSITE_BOOTSTRAP_ADMIN_PASSWORD").ok_or_else(|| {
                    ConfigError::Missing {
                        key: "NESTSITE_BOOTSTRAP_ADMIN_PASSWORD".into(),
                    }
                })?,
            }),
            None => None,
        };

        Ok(Self {
            bind_addr: src.try_load("NESTSITE_BIND_ADDR", "0.0.0.0:8080")?,
            db,
            auth,
            base_domain: src.var("NESTSITE_BASE_DOMAIN"),
            media_dir: src.try_load("NESTSITE_MEDIA_DIR", "./media")?,
            media_base_url: src.try_load("NESTSITE_MEDIA_BASE_URL", "/media")?,
            max_upload_bytes: src.try_load("NESTSITE_MAX_UPLOAD_BYTES", "10485760")?,
            cors_origins: src
                .var("NESTSITE_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            bootstrap,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const KEYS: [(&str, &str); 2] = [
        ("NESTSITE_JWT_PRIVATE_KEY", "private"),
        ("NESTSITE_JWT_PUBLIC_KEY", "public"),
    ];

    #[test]
    fn defaults_apply() {
        let config = ServerConfig::from_lookup(lookup(&KEYS)).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.db.namespace, "nestsite");
        assert_eq!(config.auth.access_token_lifetime_secs, 3600);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.cors_origins.is_empty());
        assert!(config.bootstrap.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = KEYS.to_vec();
        pairs.extend([
            ("NESTSITE_DB_URL", "mem://"),
            ("NESTSITE_BASE_DOMAIN", "nestsite.app"),
            ("NESTSITE_CORS_ORIGINS", "https://admin.nestsite.app, https://x.example"),
            ("NESTSITE_BOOTSTRAP_ADMIN_EMAIL", "ops@nestsite.app"),
            ("NESTSITE_BOOTSTRAP_ADMIN_PASSWORD", "lighthouse-2026"),
        ]);
        let config = ServerConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.db.url, "mem://");
        assert_eq!(config.base_domain.as_deref(), Some("nestsite.app"));
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.bootstrap.unwrap().agency_slug, "nestsite");
    }

    #[test]
    fn missing_keys_and_bad_numbers_fail() {
        let err = ServerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));

        let mut pairs = KEYS.to_vec();
        pairs.push(("NESTSITE_MAX_UPLOAD_BYTES", "lots"));
        let err = ServerConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
