//! Content blocks edited in-context by tenant staff.
//!
//! A block is an opaque JSON value addressed by a key such as
//! `hero.title` or `about.body`; the front end decides how to render it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: Uuid,
    pub property_id: Uuid,
    pub key: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
