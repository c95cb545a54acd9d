//! Pricing rules.
//!
//! A rule prices either the whole property or a single room, optionally
//! restricted to a season (`starts_on..=ends_on`, ISO `YYYY-MM-DD`).
//! Amounts are stored in minor currency units to avoid floating point.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRule {
    pub id: Uuid,
    pub property_id: Uuid,
    pub room_id: Option<Uuid>,
    pub label: String,
    /// Nightly amount in minor units (e.g. cents).
    pub amount_minor: u64,
    /// ISO-4217 code, e.g. `EUR`.
    pub currency: String,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub min_nights: u32,
    pub sort_order: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PricingRule {
    /// Whether the rule applies to a stay night on `date`.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.starts_on.is_none_or(|start| date >= start)
            && self.ends_on.is_none_or(|end| date <= end)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePricingRule {
    pub property_id: Uuid,
    pub room_id: Option<Uuid>,
    pub label: String,
    pub amount_minor: u64,
    pub currency: String,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub min_nights: u32,
    pub sort_order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePricingRule {
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub room_id: Option<Option<Uuid>>,
    pub label: Option<String>,
    pub amount_minor: Option<u64>,
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub starts_on: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub ends_on: Option<Option<NaiveDate>>,
    pub min_nights: Option<u32>,
    pub sort_order: Option<u32>,
}
