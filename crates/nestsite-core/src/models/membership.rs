//! Membership domain model: a (user, tenant, role) assignment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a user inside a tenant, ordered from most to least privileged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl MembershipRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MembershipRole::Owner => "Owner",
            MembershipRole::Admin => "Admin",
            MembershipRole::Editor => "Editor",
            MembershipRole::Viewer => "Viewer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Owner" => Some(MembershipRole::Owner),
            "Admin" => Some(MembershipRole::Admin),
            "Editor" => Some(MembershipRole::Editor),
            "Viewer" => Some(MembershipRole::Viewer),
            _ => None,
        }
    }

    /// Numeric privilege level; higher means more privileged.
    pub fn rank(self) -> u8 {
        match self {
            MembershipRole::Owner => 4,
            MembershipRole::Admin => 3,
            MembershipRole::Editor => 2,
            MembershipRole::Viewer => 1,
        }
    }

    pub fn at_least(self, other: MembershipRole) -> bool {
        self.rank() >= other.rank()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: MembershipRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: MembershipRole,
}
