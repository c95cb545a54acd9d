//! Tenant management, including the cascading delete.

use std::sync::Arc;

use nestsite_auth::{Action, Principal, authorize_agency};
use nestsite_core::error::{NestError, NestResult};
use nestsite_core::models::tenant::{CreateTenant, Tenant, UpdateTenant};
use nestsite_core::repository::{
    AgencyRepository, MembershipRepository, ObjectStore, PaginatedResult, Pagination,
    PropertyRepository, Repositories, TenantRepository,
};
use nestsite_core::validation::{require_text, validate_slug};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::guard;
use crate::property::PropertyService;

/// Request to create a tenant. Agency staff may omit `agency_id`; it
/// defaults to their own agency.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTenant {
    #[serde(default)]
    pub agency_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

pub struct TenantService<R, S> {
    repos: Arc<R>,
    properties: PropertyService<R, S>,
}

impl<R, S> Clone for TenantService<R, S> {
    fn clone(&self) -> Self {
        Self {
            repos: Arc::clone(&self.repos),
            properties: self.properties.clone(),
        }
    }
}

impl<R: Repositories, S: ObjectStore> TenantService<R, S> {
    pub fn new(repos: Arc<R>, store: Arc<S>) -> Self {
        Self {
            properties: PropertyService::new(Arc::clone(&repos), store),
            repos,
        }
    }

    pub async fn create(&self, principal: &Principal, input: NewTenant) -> NestResult<Tenant> {
        let agency_id = input
            .agency_id
            .or(principal.agency_id)
            .ok_or_else(|| NestError::denied("agency staff only"))?;
        authorize_agency(principal, agency_id)?;
        require_text("name", &input.name)?;
        validate_slug(&input.slug)?;

        // Make sure the agency is real before hanging a tenant off it.
        self.repos.agencies().get_by_id(agency_id).await?;
        guard::ensure_absent(
            self.repos.tenants().get_by_slug(agency_id, &input.slug).await,
            "tenant",
        )?;

        let tenant = self
            .repos
            .tenants()
            .create(CreateTenant {
                agency_id,
                name: input.name.trim().to_string(),
                slug: input.slug,
                metadata: input.metadata,
            })
            .await?;
        info!(
            tenant_id = %tenant.id,
            agency_id = %agency_id,
            slug = %tenant.slug,
            "Tenant created"
        );
        Ok(tenant)
    }

    pub async fn get(&self, principal: &Principal, id: Uuid) -> NestResult<Tenant> {
        guard::tenant(&*self.repos, principal, id, Action::ViewTenant).await
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: UpdateTenant,
    ) -> NestResult<Tenant> {
        let tenant = guard::tenant(&*self.repos, principal, id, Action::ManageTenant).await?;
        if let Some(name) = &input.name {
            require_text("name", name)?;
        }
        if let Some(slug) = input.slug.as_deref().filter(|s| *s != tenant.slug) {
            validate_slug(slug)?;
            guard::ensure_absent(
                self.repos.tenants().get_by_slug(tenant.agency_id, slug).await,
                "tenant",
            )?;
        }

        let updated = self.repos.tenants().update(id, input).await?;
        info!(tenant_id = %id, "Tenant updated");
        Ok(updated)
    }

    /// Tenants the caller can see: every tenant of their agency for staff,
    /// otherwise the tenants they hold a membership in.
    pub async fn list_visible(
        &self,
        principal: &Principal,
        pagination: Pagination,
    ) -> NestResult<PaginatedResult<Tenant>> {
        if let Some(agency_id) = principal.agency_id {
            return self
                .repos
                .tenants()
                .list_by_agency(agency_id, pagination)
                .await;
        }

        let memberships = self
            .repos
            .memberships()
            .list_by_user(principal.user_id)
            .await?;
        let total = memberships.len() as u64;
        let mut items = Vec::new();
        for membership in memberships
            .iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
        {
            items.push(self.repos.tenants().get_by_id(membership.tenant_id).await?);
        }

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    /// Delete a tenant together with all of its properties (and their
    /// children) and memberships.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> NestResult<()> {
        let tenant = guard::tenant(&*self.repos, principal, id, Action::DeleteTenant).await?;

        let mut removed = 0usize;
        loop {
            let page = self
                .repos
                .properties()
                .list_by_tenant(id, Pagination::default())
                .await?;
            if page.items.is_empty() {
                break;
            }
            for property in &page.items {
                self.properties.purge(property).await?;
                removed += 1;
            }
        }

        self.repos.memberships().delete_by_tenant(id).await?;
        self.repos.tenants().delete(id).await?;
        info!(
            tenant_id = %id,
            agency_id = %tenant.agency_id,
            properties = removed,
            "Tenant deleted"
        );
        Ok(())
    }
}
