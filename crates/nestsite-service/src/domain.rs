//! Custom hostnames of a property.
//!
//! A property has at most one primary domain. Setting a new primary
//! first clears the flag on the others; the two steps are not atomic and
//! concurrent edits may briefly leave no primary or two.

use std::sync::Arc;

use nestsite_auth::{Action, Principal};
use nestsite_core::error::{NestError, NestResult};
use nestsite_core::models::domain::{CreateDomain, Domain};
use nestsite_core::repository::{DomainRepository, Repositories};
use nestsite_core::validation::validate_hostname;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::guard;

#[derive(Debug, Clone, Deserialize)]
pub struct AddDomain {
    pub hostname: String,
    #[serde(default)]
    pub is_primary: bool,
}

pub struct DomainService<R> {
    repos: Arc<R>,
}

impl<R> Clone for DomainService<R> {
    fn clone(&self) -> Self {
        Self {
            repos: Arc::clone(&self.repos),
        }
    }
}

impl<R: Repositories> DomainService<R> {
    pub fn new(repos: Arc<R>) -> Self {
        Self { repos }
    }

    pub async fn list(&self, principal: &Principal, property_id: Uuid) -> NestResult<Vec<Domain>> {
        guard::property(&*self.repos, principal, property_id, Action::ViewProperty).await?;
        self.repos.domains().list_by_property(property_id).await
    }

    /// Attach a hostname to a property. The first domain of a property
    /// always becomes its primary.
    pub async fn add(
        &self,
        principal: &Principal,
        property_id: Uuid,
        input: AddDomain,
    ) -> NestResult<Domain> {
        let (tenant, _) =
            guard::property(&*self.repos, principal, property_id, Action::ManageDomains).await?;
        let hostname = validate_hostname(&input.hostname)?;

        if self.repos.domains().get_by_hostname(&hostname).await?.is_some() {
            return Err(NestError::AlreadyExists {
                entity: "domain".into(),
            });
        }

        let existing = self.repos.domains().list_by_property(property_id).await?;
        let is_primary = input.is_primary || existing.is_empty();
        if is_primary {
            self.repos.domains().clear_primary(property_id).await?;
        }

        let domain = self
            .repos
            .domains()
            .create(CreateDomain {
                property_id,
                tenant_id: tenant.id,
                hostname,
                is_primary,
            })
            .await?;
        info!(
            domain_id = %domain.id,
            property_id = %property_id,
            hostname = %domain.hostname,
            is_primary,
            "Domain added"
        );
        Ok(domain)
    }

    pub async fn set_primary(&self, principal: &Principal, id: Uuid) -> NestResult<Domain> {
        let domain = self.repos.domains().get_by_id(id).await?;
        guard::property(
            &*self.repos,
            principal,
            domain.property_id,
            Action::ManageDomains,
        )
        .await?;

        self.repos.domains().clear_primary(domain.property_id).await?;
        let domain = self.repos.domains().set_primary(id, true).await?;
        info!(domain_id = %id, property_id = %domain.property_id, "Primary domain changed");
        Ok(domain)
    }

    /// Remove a hostname. Removing the primary leaves the property
    /// without one until another is promoted explicitly.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> NestResult<()> {
        let domain = self.repos.domains().get_by_id(id).await?;
        guard::property(
            &*self.repos,
            principal,
            domain.property_id,
            Action::ManageDomains,
        )
        .await?;

        self.repos.domains().delete(id).await?;
        info!(domain_id = %id, hostname = %domain.hostname, "Domain removed");
        Ok(())
    }
}
