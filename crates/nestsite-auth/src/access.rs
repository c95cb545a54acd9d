//! Tenant-scoped access control.
//!
//! A [`Principal`] is the authenticated caller together with its tenant
//! memberships. Agency staff (users carrying an `agency_id`) may act on
//! every tenant of their agency; everyone else needs a membership whose
//! role allows the requested [`Action`].

use std::collections::HashMap;

use nestsite_core::models::membership::{Membership, MembershipRole};
use nestsite_core::models::tenant::Tenant;
use uuid::Uuid;

use crate::error::AuthError;

/// Something a caller wants to do inside a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewTenant,
    ManageTenant,
    CreateTenant,
    DeleteTenant,
    ManageMembers,
    ViewProperty,
    EditContent,
    ManageDomains,
    CreateProperty,
    DeleteProperty,
    PublishProperty,
    ImportProperty,
    UploadMedia,
}

impl Action {
    fn agency_only(self) -> bool {
        matches!(self, Action::CreateTenant | Action::DeleteTenant)
    }
}

/// Whether a tenant role permits `action`.
pub fn role_allows(role: MembershipRole, action: Action) -> bool {
    use Action::*;
    match action {
        ViewTenant | ViewProperty => true,
        EditContent | UploadMedia => role.at_least(MembershipRole::Editor),
        ManageMembers | ManageDomains | CreateProperty | DeleteProperty | PublishProperty
        | ImportProperty => role.at_least(MembershipRole::Admin),
        ManageTenant => role == MembershipRole::Owner,
        CreateTenant | DeleteTenant => false,
    }
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub agency_id: Option<Uuid>,
    pub memberships: HashMap<Uuid, MembershipRole>,
}

impl Principal {
    pub fn new(user_id: Uuid, agency_id: Option<Uuid>, memberships: Vec<Membership>) -> Self {
        Self {
            user_id,
            agency_id,
            memberships: memberships
                .into_iter()
                .map(|m| (m.tenant_id, m.role))
                .collect(),
        }
    }

    pub fn role_in(&self, tenant_id: Uuid) -> Option<MembershipRole> {
        self.memberships.get(&tenant_id).copied()
    }

    pub fn is_agency_staff(&self, agency_id: Uuid) -> bool {
        self.agency_id == Some(agency_id)
    }
}

/// Check that `principal` may perform `action` on `tenant`.
pub fn authorize(principal: &Principal, tenant: &Tenant, action: Action) -> Result<(), AuthError> {
    if principal.is_agency_staff(tenant.agency_id) {
        return Ok(());
    }
    if action.agency_only() {
        return Err(AuthError::Forbidden(format!(
            "{action:?} requires agency staff"
        )));
    }
    match principal.role_in(tenant.id) {
        Some(role) if role_allows(role, action) => Ok(()),
        Some(role) => Err(AuthError::Forbidden(format!(
            "role {} may not {action:?}",
            role.as_str()
        ))),
        None => Err(AuthError::Forbidden("not a member of this tenant".into())),
    }
}

/// Check that `principal` is staff of `agency_id` (tenant creation).
pub fn authorize_agency(principal: &Principal, agency_id: Uuid) -> Result<(), AuthError> {
    if principal.is_agency_staff(agency_id) {
        Ok(())
    } else {
        Err(AuthError::Forbidden("agency staff only".into()))
    }
}
