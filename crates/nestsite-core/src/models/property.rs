//! Property domain model.
//!
//! A property is a homestay or boutique listing with its own public
//! microsite. Its slug is unique within the owning tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::theme::Theme;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    /// Visible to tenant staff only.
    #[default]
    Draft,
    /// Served on the public web.
    Published,
    Archived,
}

impl PropertyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyStatus::Draft => "Draft",
            PropertyStatus::Published => "Published",
            PropertyStatus::Archived => "Archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Draft" => Some(PropertyStatus::Draft),
            "Published" => Some(PropertyStatus::Published),
            "Archived" => Some(PropertyStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub slug: String,
    pub name: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    /// Local time of day, e.g. `14:00`.
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub theme: Theme,
    pub status: PropertyStatus,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateProperty {
    pub tenant_id: Uuid,
    pub slug: String,
    pub name: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub theme: Option<Theme>,
    pub status: Option<PropertyStatus>,
    pub metadata: Option<serde_json::Value>,
}

/// Fields that can be updated on an existing property.
///
/// For the optional text fields `Some(None)` clears the value.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProperty {
    pub slug: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub tagline: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub contact_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub contact_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub check_in_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub check_out_time: Option<Option<String>>,
    pub status: Option<PropertyStatus>,
    pub metadata: Option<serde_json::Value>,
}
