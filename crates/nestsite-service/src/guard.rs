//! Load-then-authorize helpers shared by the services.

use nestsite_auth::{Action, Principal, authorize};
use nestsite_core::error::{NestError, NestResult};
use nestsite_core::models::property::Property;
use nestsite_core::models::tenant::Tenant;
use nestsite_core::repository::{PropertyRepository, Repositories, TenantRepository};
use uuid::Uuid;

pub(crate) async fn tenant<R: Repositories>(
    repos: &R,
    principal: &Principal,
    tenant_id: Uuid,
    action: Action,
) -> NestResult<Tenant> {
    let tenant = repos.tenants().get_by_id(tenant_id).await?;
    authorize(principal, &tenant, action)?;
    Ok(tenant)
}

pub(crate) async fn property<R: Repositories>(
    repos: &R,
    principal: &Principal,
    property_id: Uuid,
    action: Action,
) -> NestResult<(Tenant, Property)> {
    let property = repos.properties().get_by_id(property_id).await?;
    let tenant = tenant(repos, principal, property.tenant_id, action).await?;
    Ok((tenant, property))
}

/// Turn a lookup that is expected to miss into a uniqueness check.
pub(crate) fn ensure_absent<T>(lookup: NestResult<T>, entity: &str) -> NestResult<()> {
    match lookup {
        Ok(_) => Err(NestError::AlreadyExists {
            entity: entity.into(),
        }),
        Err(NestError::NotFound { .. }) => Ok(()),
        Err(e) => Err(e),
    }
}
