//! User and membership provisioning.
//!
//! Users are global and looked up by e-mail; provisioning a user into a
//! tenant reuses an existing account when the address is already known.
//! Accounts created without a password are `Invited` and receive a
//! one-time token that is exchanged for a password later.

use std::sync::Arc;

use nestsite_auth::password::{check_password_policy, hash_password};
use nestsite_auth::token::{generate_invite_token, hash_invite_token};
use nestsite_auth::{Action, AuthConfig, AuthError, Principal};
use nestsite_core::error::{NestError, NestResult};
use nestsite_core::models::agency::{Agency, CreateAgency};
use nestsite_core::models::membership::{CreateMembership, Membership, MembershipRole};
use nestsite_core::models::tenant::Tenant;
use nestsite_core::models::user::{CreateUser, UpdateUser, User, UserStatus};
use nestsite_core::repository::{
    AgencyRepository, MembershipRepository, Repositories, UserRepository,
};
use nestsite_core::validation::{require_text, validate_email, validate_slug};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::guard;

/// Body of the create-user operation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub email: String,
    pub tenant_id: Uuid,
    pub role: MembershipRole,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// When absent the user is invited instead of activated.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateUserOutput {
    pub user: User,
    pub membership: Membership,
    /// Raw invite token; only present when an invite was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_token: Option<String>,
}

/// A membership together with the account it belongs to.
#[derive(Debug, Serialize)]
pub struct Member {
    #[serde(flatten)]
    pub membership: Membership,
    pub email: String,
    pub display_name: Option<String>,
    pub status: UserStatus,
}

/// Initial agency and staff account created at startup.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub agency_name: String,
    pub agency_slug: String,
    pub email: String,
    pub password: String,
}

pub struct UserService<R> {
    repos: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repos: Arc::clone(&self.repos),
            config: Arc::clone(&self.config),
        }
    }
}

/// Only agency staff and tenant owners may hand out or take away the
/// owner role.
fn may_manage_owners(principal: &Principal, tenant: &Tenant) -> bool {
    principal.is_agency_staff(tenant.agency_id)
        || principal.role_in(tenant.id) == Some(MembershipRole::Owner)
}

fn ensure_owner_change_allowed(
    principal: &Principal,
    tenant: &Tenant,
    roles: &[MembershipRole],
) -> NestResult<()> {
    if roles.contains(&MembershipRole::Owner) && !may_manage_owners(principal, tenant) {
        return Err(AuthError::Forbidden(
            "only owners may grant or revoke the owner role".into(),
        )
        .into());
    }
    Ok(())
}

impl<R: Repositories> UserService<R> {
    pub fn new(repos: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repos, config }
    }

    fn hash(&self, password: &str) -> NestResult<String> {
        check_password_policy(password, self.config.min_password_length)?;
        Ok(hash_password(password, self.config.pepper.as_deref())?)
    }

    /// Create (or reuse) the account for `input.email` and grant it
    /// `input.role` in the tenant.
    pub async fn create_user(
        &self,
        principal: &Principal,
        input: CreateUserInput,
    ) -> NestResult<CreateUserOutput> {
        let tenant =
            guard::tenant(&*self.repos, principal, input.tenant_id, Action::ManageMembers).await?;
        ensure_owner_change_allowed(principal, &tenant, &[input.role])?;
        let email = validate_email(&input.email)?;

        let mut invite_token = None;
        let user = match self.repos.users().get_by_email(&email).await? {
            Some(user) => {
                if self
                    .repos
                    .memberships()
                    .get(user.id, tenant.id)
                    .await?
                    .is_some()
                {
                    return Err(NestError::AlreadyExists {
                        entity: "membership".into(),
                    });
                }
                if user.status == UserStatus::Invited {
                    // A fresh token replaces whatever was sent before.
                    let token = generate_invite_token();
                    let user = self
                        .repos
                        .users()
                        .update(
                            user.id,
                            UpdateUser {
                                invite_token_hash: Some(Some(hash_invite_token(&token))),
                                ..Default::default()
                            },
                        )
                        .await?;
                    invite_token = Some(token);
                    user
                } else {
                    user
                }
            }
            None => {
                let (status, password_hash, invite_token_hash) = match &input.password {
                    Some(password) => (UserStatus::Active, Some(self.hash(password)?), None),
                    None => {
                        let token = generate_invite_token();
                        let hash = hash_invite_token(&token);
                        invite_token = Some(token);
                        (UserStatus::Invited, None, Some(hash))
                    }
                };
                let user = self
                    .repos
                    .users()
                    .create(CreateUser {
                        email,
                        display_name: input.display_name,
                        phone: input.phone,
                        password_hash,
                        status,
                        agency_id: None,
                        invite_token_hash,
                    })
                    .await?;
                info!(user_id = %user.id, status = user.status.as_str(), "User created");
                user
            }
        };

        let membership = self
            .repos
            .memberships()
            .create(CreateMembership {
                user_id: user.id,
                tenant_id: tenant.id,
                role: input.role,
            })
            .await?;
        info!(
            user_id = %user.id,
            tenant_id = %tenant.id,
            role = membership.role.as_str(),
            invited = invite_token.is_some(),
            "Membership granted"
        );

        Ok(CreateUserOutput {
            user,
            membership,
            invite_token,
        })
    }

    /// Exchange an invite token for a password and activate the account.
    pub async fn accept_invite(&self, token: &str, password: &str) -> NestResult<User> {
        let user = self
            .repos
            .users()
            .get_by_invite_token_hash(&hash_invite_token(token))
            .await?
            .filter(|u| u.status == UserStatus::Invited)
            .ok_or_else(|| AuthError::TokenInvalid("unknown or used invite".into()))?;
        let password_hash = self.hash(password)?;

        let user = self
            .repos
            .users()
            .update(
                user.id,
                UpdateUser {
                    password_hash: Some(Some(password_hash)),
                    status: Some(UserStatus::Active),
                    invite_token_hash: Some(None),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id = %user.id, "Invite accepted");
        Ok(user)
    }

    pub async fn list_members(
        &self,
        principal: &Principal,
        tenant_id: Uuid,
    ) -> NestResult<Vec<Member>> {
        guard::tenant(&*self.repos, principal, tenant_id, Action::ViewTenant).await?;
        let memberships = self.repos.memberships().list_by_tenant(tenant_id).await?;
        let mut members = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let user = self.repos.users().get_by_id(membership.user_id).await?;
            members.push(Member {
                membership,
                email: user.email,
                display_name: user.display_name,
                status: user.status,
            });
        }
        Ok(members)
    }

    pub async fn change_role(
        &self,
        principal: &Principal,
        membership_id: Uuid,
        role: MembershipRole,
    ) -> NestResult<Membership> {
        let membership = self.repos.memberships().get_by_id(membership_id).await?;
        let tenant = guard::tenant(
            &*self.repos,
            principal,
            membership.tenant_id,
            Action::ManageMembers,
        )
        .await?;
        ensure_owner_change_allowed(principal, &tenant, &[membership.role, role])?;

        let updated = self
            .repos
            .memberships()
            .update_role(membership_id, role)
            .await?;
        info!(
            membership_id = %membership_id,
            from = membership.role.as_str(),
            to = role.as_str(),
            "Membership role changed"
        );
        Ok(updated)
    }

    pub async fn remove_member(
        &self,
        principal: &Principal,
        membership_id: Uuid,
    ) -> NestResult<()> {
        let membership = self.repos.memberships().get_by_id(membership_id).await?;
        let tenant = guard::tenant(
            &*self.repos,
            principal,
            membership.tenant_id,
            Action::ManageMembers,
        )
        .await?;
        ensure_owner_change_allowed(principal, &tenant, &[membership.role])?;

        self.repos.memberships().delete(membership_id).await?;
        info!(
            membership_id = %membership_id,
            user_id = %membership.user_id,
            tenant_id = %membership.tenant_id,
            "Membership removed"
        );
        Ok(())
    }

    /// Make sure the configured agency and its first staff account exist.
    /// Safe to run on every start.
    pub async fn bootstrap(&self, admin: &BootstrapAdmin) -> NestResult<Agency> {
        validate_slug(&admin.agency_slug)?;
        require_text("agency name", &admin.agency_name)?;
        let email = validate_email(&admin.email)?;

        let agency = match self.repos.agencies().get_by_slug(&admin.agency_slug).await {
            Ok(agency) => agency,
            Err(NestError::NotFound { .. }) => {
                let agency = self
                    .repos
                    .agencies()
                    .create(CreateAgency {
                        name: admin.agency_name.clone(),
                        slug: admin.agency_slug.clone(),
                        metadata: None,
                    })
                    .await?;
                info!(agency_id = %agency.id, slug = %agency.slug, "Agency bootstrapped");
                agency
            }
            Err(e) => return Err(e),
        };

        if self.repos.users().get_by_email(&email).await?.is_none() {
            let user = self
                .repos
                .users()
                .create(CreateUser {
                    email,
                    display_name: None,
                    phone: None,
                    password_hash: Some(self.hash(&admin.password)?),
                    status: UserStatus::Active,
                    agency_id: Some(agency.id),
                    invite_token_hash: None,
                })
                .await?;
            info!(user_id = %user.id, agency_id = %agency.id, "Agency admin bootstrapped");
        }
        Ok(agency)
    }
}
