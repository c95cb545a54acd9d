//! Room domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    /// Unique within the property; used by imports to reference rooms.
    pub slug: String,
    pub description: Option<String>,
    /// Maximum number of guests.
    pub capacity: u32,
    pub beds: u32,
    pub sort_order: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoom {
    pub property_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub capacity: u32,
    pub beds: u32,
    pub sort_order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRoom {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub description: Option<Option<String>>,
    pub capacity: Option<u32>,
    pub beds: Option<u32>,
    pub sort_order: Option<u32>,
}
