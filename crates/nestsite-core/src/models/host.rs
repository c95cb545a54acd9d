//! Host domain model: the people welcoming guests at a property.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub sort_order: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHost {
    pub property_id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub sort_order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateHost {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub photo_url: Option<Option<String>>,
    pub sort_order: Option<u32>,
}
