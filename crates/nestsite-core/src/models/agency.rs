//! Agency domain model.
//!
//! Agencies are the top-level entity in the NestSite hierarchy. An agency
//! operates the platform on behalf of several tenant organizations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An agency groups multiple tenants under a single operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agency {
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// URL-safe globally unique identifier (e.g., `island-stays`).
    pub slug: String,
    /// Arbitrary key-value metadata.
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new agency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAgency {
    pub name: String,
    pub slug: String,
    pub metadata: Option<serde_json::Value>,
}

/// Fields that can be updated on an existing agency.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAgency {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub metadata: Option<serde_json::Value>,
}
