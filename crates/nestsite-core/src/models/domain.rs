//! Domain (hostname) model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A hostname routed to a specific property for public serving.
///
/// Hostnames are stored normalized (lower-case, no port, no trailing
/// dot) and are unique across the whole platform. At most one domain per
/// property carries `is_primary`; it is the canonical host of the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub id: Uuid,
    pub property_id: Uuid,
    /// Denormalized so tenant-wide cleanup does not need a join.
    pub tenant_id: Uuid,
    pub hostname: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDomain {
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub hostname: String,
    pub is_primary: bool,
}
