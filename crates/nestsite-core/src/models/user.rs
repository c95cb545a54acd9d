//! User domain model.
//!
//! Users are global: a single login can hold memberships in several
//! tenants. Agency staff additionally carry the id of their agency.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    /// Created through an invite that has not been accepted yet.
    Invited,
    Disabled,
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Invited => "Invited",
            UserStatus::Disabled => "Disabled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Active" => Some(UserStatus::Active),
            "Invited" => Some(UserStatus::Invited),
            "Disabled" => Some(UserStatus::Disabled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Lower-cased, globally unique.
    pub email: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    /// Argon2id PHC string; `None` until an invite is accepted.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub status: UserStatus,
    /// Set for agency staff, who may administer every tenant of the agency.
    pub agency_id: Option<Uuid>,
    /// SHA-256 of the outstanding invite token, if any.
    #[serde(skip_serializing)]
    pub invite_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    /// Already hashed; hashing happens in the auth layer.
    pub password_hash: Option<String>,
    pub status: UserStatus,
    pub agency_id: Option<Uuid>,
    pub invite_token_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub display_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub password_hash: Option<Option<String>>,
    pub status: Option<UserStatus>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub invite_token_hash: Option<Option<String>>,
}
