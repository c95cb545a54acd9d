//! Property lifecycle: create, edit, theme selection, publish, delete.

use std::sync::Arc;

use nestsite_auth::{Action, Principal, authorize};
use nestsite_core::error::{NestError, NestResult};
use nestsite_core::models::property::{CreateProperty, Property, UpdateProperty};
use nestsite_core::models::theme::Theme;
use nestsite_core::repository::{
    ContentRepository, DomainRepository, HostRepository, MediaRepository, ObjectStore,
    PaginatedResult, Pagination, PricingRepository, PropertyRepository, Repositories,
    RoomRepository,
};
use nestsite_core::validation::{check_email, check_slug, check_time_of_day};
use tracing::{info, warn};
use uuid::Uuid;

use crate::guard;

pub struct PropertyService<R, S> {
    repos: Arc<R>,
    store: Arc<S>,
}

impl<R, S> Clone for PropertyService<R, S> {
    fn clone(&self) -> Self {
        Self {
            repos: Arc::clone(&self.repos),
            store: Arc::clone(&self.store),
        }
    }
}

/// Field-level problems with a new property, as `(field, reason)` pairs.
pub(crate) fn check_new_property(input: &CreateProperty) -> Vec<(&'static str, String)> {
    let mut issues = Vec::new();
    if let Err(reason) = check_slug(&input.slug) {
        issues.push(("slug", reason));
    }
    if input.name.trim().is_empty() {
        issues.push(("name", "must not be empty".to_string()));
    }
    if let Some(email) = &input.contact_email {
        if let Err(reason) = check_email(&email.to_ascii_lowercase()) {
            issues.push(("contact_email", reason));
        }
    }
    for (field, value) in [
        ("check_in_time", &input.check_in_time),
        ("check_out_time", &input.check_out_time),
    ] {
        if let Some(Err(reason)) = value.as_deref().map(check_time_of_day) {
            issues.push((field, reason));
        }
    }
    issues
}

fn check_update(input: &UpdateProperty) -> NestResult<()> {
    let mut issues = Vec::new();
    if let Some(Err(reason)) = input.slug.as_deref().map(check_slug) {
        issues.push(("slug", reason));
    }
    if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        issues.push(("name", "must not be empty".to_string()));
    }
    if let Some(Some(email)) = &input.contact_email {
        if let Err(reason) = check_email(&email.to_ascii_lowercase()) {
            issues.push(("contact_email", reason));
        }
    }
    for (field, value) in [
        ("check_in_time", &input.check_in_time),
        ("check_out_time", &input.check_out_time),
    ] {
        if let Some(Some(Err(reason))) = value.as_ref().map(|v| v.as_deref().map(check_time_of_day))
        {
            issues.push((field, reason));
        }
    }
    first_issue(issues)
}

fn first_issue(issues: Vec<(&'static str, String)>) -> NestResult<()> {
    match issues.into_iter().next() {
        Some((field, reason)) => Err(NestError::validation(format!("{field} {reason}"))),
        None => Ok(()),
    }
}

impl<R: Repositories, S: ObjectStore> PropertyService<R, S> {
    pub fn new(repos: Arc<R>, store: Arc<S>) -> Self {
        Self { repos, store }
    }

    pub async fn create(
        &self,
        principal: &Principal,
        mut input: CreateProperty,
    ) -> NestResult<Property> {
        guard::tenant(&*self.repos, principal, input.tenant_id, Action::CreateProperty).await?;
        first_issue(check_new_property(&input))?;
        input.contact_email = input.contact_email.map(|e| e.to_ascii_lowercase());
        guard::ensure_absent(
            self.repos
                .properties()
                .get_by_slug(input.tenant_id, &input.slug)
                .await,
            "property",
        )?;

        let property = self.repos.properties().create(input).await?;
        info!(
            property_id = %property.id,
            tenant_id = %property.tenant_id,
            slug = %property.slug,
            "Property created"
        );
        Ok(property)
    }

    pub async fn get(&self, principal: &Principal, id: Uuid) -> NestResult<Property> {
        let (_, property) =
            guard::property(&*self.repos, principal, id, Action::ViewProperty).await?;
        Ok(property)
    }

    pub async fn list(
        &self,
        principal: &Principal,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> NestResult<PaginatedResult<Property>> {
        guard::tenant(&*self.repos, principal, tenant_id, Action::ViewTenant).await?;
        self.repos
            .properties()
            .list_by_tenant(tenant_id, pagination)
            .await
    }

    /// Edit a property. Changing the slug or the publication status
    /// additionally requires the publish permission.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        mut input: UpdateProperty,
    ) -> NestResult<Property> {
        let (tenant, property) =
            guard::property(&*self.repos, principal, id, Action::EditContent).await?;
        if input.status.is_some() || input.slug.is_some() {
            authorize(principal, &tenant, Action::PublishProperty)?;
        }
        check_update(&input)?;

        if let Some(slug) = input.slug.as_deref().filter(|s| *s != property.slug) {
            guard::ensure_absent(
                self.repos.properties().get_by_slug(tenant.id, slug).await,
                "property",
            )?;
        }
        if let Some(Some(email)) = input.contact_email.as_mut() {
            *email = email.to_ascii_lowercase();
        }

        let updated = self.repos.properties().update(id, input).await?;
        info!(property_id = %id, status = updated.status.as_str(), "Property updated");
        Ok(updated)
    }

    /// Select the microsite theme by name; unknown names are rejected.
    pub async fn set_theme(
        &self,
        principal: &Principal,
        id: Uuid,
        name: &str,
    ) -> NestResult<Property> {
        guard::property(&*self.repos, principal, id, Action::EditContent).await?;
        let theme = Theme::parse(name).ok_or_else(|| {
            let known: Vec<&str> = Theme::ALL.iter().map(|t| t.as_str()).collect();
            NestError::validation(format!(
                "unknown theme '{name}', expected one of: {}",
                known.join(", ")
            ))
        })?;

        let property = self.repos.properties().set_theme(id, theme).await?;
        info!(property_id = %id, theme = %theme, "Theme selected");
        Ok(property)
    }

    pub async fn delete(&self, principal: &Principal, id: Uuid) -> NestResult<()> {
        let (_, property) =
            guard::property(&*self.repos, principal, id, Action::DeleteProperty).await?;
        self.purge(&property).await
    }

    /// Remove a property and everything hanging off it. Stored media
    /// objects are deleted last and failures there are only logged.
    pub(crate) async fn purge(&self, property: &Property) -> NestResult<()> {
        let id = property.id;
        let repos = &*self.repos;

        repos.domains().delete_by_property(id).await?;
        repos.rooms().delete_by_property(id).await?;
        repos.hosts().delete_by_property(id).await?;
        repos.pricing().delete_by_property(id).await?;
        repos.content().delete_by_property(id).await?;

        let storage_keys: Vec<String> = repos
            .media()
            .list_by_property(id)
            .await?
            .into_iter()
            .filter_map(|m| m.storage_key)
            .collect();
        repos.media().delete_by_property(id).await?;

        for key in &storage_keys {
            if let Err(e) = self.store.delete(key).await {
                warn!(property_id = %id, key = %key, error = %e, "Failed to delete stored media");
            }
        }

        repos.properties().delete(id).await?;
        info!(
            property_id = %id,
            tenant_id = %property.tenant_id,
            media_objects = storage_keys.len(),
            "Property deleted"
        );
        Ok(())
    }
}
