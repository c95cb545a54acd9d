//! Public site resolution: which property does a `Host` header name?
//!
//! Lookup order:
//! 1. exact match on a registered domain;
//! 2. the same hostname with a leading `www.` added or removed;
//! 3. the platform subdomain `{property}.{tenant}.{base_domain}`.
//!
//! Only published properties resolve.

use std::collections::BTreeMap;
use std::sync::Arc;

use nestsite_core::error::{NestError, NestResult};
use nestsite_core::models::host::Host;
use nestsite_core::models::media::MediaAsset;
use nestsite_core::models::pricing::PricingRule;
use nestsite_core::models::property::{Property, PropertyStatus};
use nestsite_core::models::room::Room;
use nestsite_core::models::tenant::Tenant;
use nestsite_core::repository::{
    ContentRepository, DomainRepository, HostRepository, MediaRepository, PricingRepository,
    PropertyRepository, Repositories, RoomRepository, TenantRepository,
};
use nestsite_core::validation::normalize_hostname;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct PublicTenant {
    pub name: String,
    pub slug: String,
}

/// Everything the public microsite renders.
#[derive(Debug, Clone, Serialize)]
pub struct PublicSite {
    pub tenant: PublicTenant,
    pub property: Property,
    /// Preferred hostname; callers redirect when the request used another.
    pub canonical_host: Option<String>,
    pub rooms: Vec<Room>,
    pub hosts: Vec<Host>,
    pub pricing: Vec<PricingRule>,
    pub media: Vec<MediaAsset>,
    pub content: BTreeMap<String, serde_json::Value>,
}

impl PublicSite {
    /// Whether a request for `host` should be redirected to the
    /// canonical hostname.
    pub fn needs_redirect(&self, host: &str) -> bool {
        self.canonical_host
            .as_deref()
            .is_some_and(|canonical| canonical != normalize_hostname(host))
    }
}

fn toggle_www(hostname: &str) -> String {
    match hostname.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => format!("www.{hostname}"),
    }
}

/// `(property_slug, tenant_slug)` when `hostname` is
/// `{property}.{tenant}.{base}`.
fn platform_slugs<'a>(base: &str, hostname: &'a str) -> Option<(&'a str, &'a str)> {
    let prefix = hostname.strip_suffix(base)?.strip_suffix('.')?;
    let (property, tenant) = prefix.split_once('.')?;
    (!property.is_empty() && !tenant.is_empty() && !tenant.contains('.'))
        .then_some((property, tenant))
}

fn site_not_found(host: &str) -> NestError {
    NestError::not_found("site", host)
}

pub struct SiteResolver<R> {
    repos: Arc<R>,
    base_domain: Option<String>,
}

impl<R> Clone for SiteResolver<R> {
    fn clone(&self) -> Self {
        Self {
            repos: Arc::clone(&self.repos),
            base_domain: self.base_domain.clone(),
        }
    }
}

impl<R: Repositories> SiteResolver<R> {
    pub fn new(repos: Arc<R>, base_domain: Option<String>) -> Self {
        Self {
            repos,
            base_domain: base_domain
                .map(|d| normalize_hostname(&d))
                .filter(|d| !d.is_empty()),
        }
    }

    async fn by_domain(&self, hostname: &str) -> NestResult<Option<(Tenant, Property)>> {
        let Some(domain) = self.repos.domains().get_by_hostname(hostname).await? else {
            return Ok(None);
        };
        let property = self.repos.properties().get_by_id(domain.property_id).await?;
        let tenant = self.repos.tenants().get_by_id(property.tenant_id).await?;
        Ok(Some((tenant, property)))
    }

    async fn by_platform_subdomain(
        &self,
        hostname: &str,
    ) -> NestResult<Option<(Tenant, Property)>> {
        let Some((property_slug, tenant_slug)) = self
            .base_domain
            .as_deref()
            .and_then(|base| platform_slugs(base, hostname))
        else {
            return Ok(None);
        };
        // Tenant slugs are unique per agency only; prefer a published match.
        let mut fallback = None;
        for tenant in self.repos.tenants().list_by_slug(tenant_slug).await? {
            let lookup = self.repos.properties().get_by_slug(tenant.id, property_slug).await;
            let property = match lookup {
                Ok(property) => property,
                Err(NestError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            };
            if property.status == PropertyStatus::Published {
                return Ok(Some((tenant, property)));
            }
            fallback.get_or_insert((tenant, property));
        }
        Ok(fallback)
    }

    /// Resolve a `Host` header to its published property.
    pub async fn resolve(&self, host: &str) -> NestResult<(Tenant, Property)> {
        let hostname = normalize_hostname(host);
        if hostname.is_empty() {
            return Err(site_not_found(host));
        }

        let found = match self.by_domain(&hostname).await? {
            Some(hit) => Some(hit),
            None => match self.by_domain(&toggle_www(&hostname)).await? {
                Some(hit) => Some(hit),
                None => self.by_platform_subdomain(&hostname).await?,
            },
        };

        match found {
            Some((tenant, property)) if property.status == PropertyStatus::Published => {
                debug!(host = %hostname, property_id = %property.id, "Site resolved");
                Ok((tenant, property))
            }
            Some((_, property)) => {
                debug!(host = %hostname, property_id = %property.id, "Site not published");
                Err(site_not_found(host))
            }
            None => {
                debug!(host = %hostname, "No site for host");
                Err(site_not_found(host))
            }
        }
    }

    /// The primary domain, else the first domain, else the platform
    /// subdomain when one is configured.
    async fn canonical_host(
        &self,
        tenant: &Tenant,
        property: &Property,
    ) -> NestResult<Option<String>> {
        let domains = self.repos.domains().list_by_property(property.id).await?;
        let registered = domains
            .iter()
            .find(|d| d.is_primary)
            .or_else(|| domains.first())
            .map(|d| d.hostname.clone());
        Ok(registered.or_else(|| {
            self.base_domain
                .as_ref()
                .map(|base| format!("{}.{}.{base}", property.slug, tenant.slug))
        }))
    }

    /// Resolve `host` and gather everything its microsite shows.
    pub async fn load(&self, host: &str) -> NestResult<PublicSite> {
        let (tenant, property) = self.resolve(host).await?;
        let repos = &*self.repos;
        let id = property.id;

        let canonical_host = self.canonical_host(&tenant, &property).await?;
        let content = repos
            .content()
            .list_by_property(id)
            .await?
            .into_iter()
            .map(|block| (block.key, block.value))
            .collect();

        Ok(PublicSite {
            canonical_host,
            rooms: repos.rooms().list_by_property(id).await?,
            hosts: repos.hosts().list_by_property(id).await?,
            pricing: repos.pricing().list_by_property(id).await?,
            media: repos.media().list_by_property(id).await?,
            content,
            tenant: PublicTenant {
                name: tenant.name,
                slug: tenant.slug,
            },
            property,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn www_is_toggled_both_ways() {
        assert_eq!(toggle_www("www.casalumen.example"), "casalumen.example");
        assert_eq!(toggle_www("casalumen.example"), "www.casalumen.example");
    }

    #[test]
    fn platform_subdomain_needs_two_labels() {
        let base = "nestsite.app";
        assert_eq!(
            platform_slugs(base, "casa-lumen.lumen-group.nestsite.app"),
            Some(("casa-lumen", "lumen-group"))
        );
        assert_eq!(platform_slugs(base, "lumen-group.nestsite.app"), None);
        assert_eq!(platform_slugs(base, "a.b.c.nestsite.app"), None);
        assert_eq!(platform_slugs(base, "casa.lumen.othernestsite.app"), None);
    }
}
