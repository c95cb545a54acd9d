//! SurrealDB implementation of [`PricingRepository`].
//!
//! Season bounds are stored as ISO `YYYY-MM-DD` strings.

use chrono::{DateTime, NaiveDate, Utc};
use nestsite_core::error::NestResult;
use nestsite_core::models::pricing::{CreatePricingRule, PricingRule, UpdatePricingRule};
use nestsite_core::repository::PricingRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_opt_uuid, parse_uuid, single};
use crate::error::DbError;

const ENTITY: &str = "pricing_rule";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, SurrealValue)]
struct PricingRow {
    record_id: String,
    property_id: String,
    room_id: Option<String>,
    label: String,
    amount_minor: u64,
    currency: String,
    starts_on: Option<String>,
    ends_on: Option<String>,
    min_nights: u32,
    sort_order: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_date(raw: Option<String>) -> Result<Option<NaiveDate>, DbError> {
    raw.map(|s| {
        NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| DbError::Decode {
            entity: ENTITY.into(),
            message: format!("invalid date '{s}': {e}"),
        })
    })
    .transpose()
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

impl PricingRow {
    fn try_into_rule(self) -> Result<PricingRule, DbError> {
        Ok(PricingRule {
            id: parse_uuid(ENTITY, &self.record_id)?,
            property_id: parse_uuid(ENTITY, &self.property_id)?,
            room_id: parse_opt_uuid(ENTITY, self.room_id)?,
            label: self.label,
            amount_minor: self.amount_minor,
            currency: self.currency,
            starts_on: parse_date(self.starts_on)?,
            ends_on: parse_date(self.ends_on)?,
            min_nights: self.min_nights,
            sort_order: self.sort_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ONE: &str = "SELECT meta::id(id) AS record_id, * \
                          FROM type::record('pricing_rule', $id)";

#[derive(Clone)]
pub struct SurrealPricingRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPricingRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PricingRepository for SurrealPricingRepository<C> {
    async fn create(&self, input: CreatePricingRule) -> NestResult<PricingRule> {
        let id_str = Uuid::new_v4().to_string();

        let query = format!(
            "CREATE type::record('pricing_rule', $id) SET \
             property_id = $property_id, room_id = $room_id, \
             label = $label, amount_minor = $amount_minor, \
             currency = $currency, starts_on = $starts_on, \
             ends_on = $ends_on, min_nights = $min_nights, \
             sort_order = $sort_order; \
             {SELECT_ONE}"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("room_id", input.room_id.map(|id| id.to_string())))
            .bind(("label", input.label))
            .bind(("amount_minor", input.amount_minor))
            .bind(("currency", input.currency))
            .bind(("starts_on", format_date(input.starts_on)))
            .bind(("ends_on", format_date(input.ends_on)))
            .bind(("min_nights", input.min_nights))
            .bind(("sort_order", input.sort_order))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<PricingRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_rule()?)
    }

    async fn get_by_id(&self, id: Uuid) -> NestResult<PricingRule> {
        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PricingRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id)?.try_into_rule()?)
    }

    async fn update(&self, id: Uuid, input: UpdatePricingRule) -> NestResult<PricingRule> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.room_id.is_some() {
            sets.push("room_id = $room_id");
        }
        if input.label.is_some() {
            sets.push("label = $label");
        }
        if input.amount_minor.is_some() {
            sets.push("amount_minor = $amount_minor");
        }
        if input.currency.is_some() {
            sets.push("currency = $currency");
        }
        if input.starts_on.is_some() {
            sets.push("starts_on = $starts_on");
        }
        if input.ends_on.is_some() {
            sets.push("ends_on = $ends_on");
        }
        if input.min_nights.is_some() {
            sets.push("min_nights = $min_nights");
        }
        if input.sort_order.is_some() {
            sets.push("sort_order = $sort_order");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('pricing_rule', $id) SET {}; {SELECT_ONE}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(room_id) = input.room_id {
            builder = builder.bind(("room_id", room_id.map(|id| id.to_string())));
        }
        if let Some(label) = input.label {
            builder = builder.bind(("label", label));
        }
        if let Some(amount_minor) = input.amount_minor {
            builder = builder.bind(("amount_minor", amount_minor));
        }
        if let Some(currency) = input.currency {
            builder = builder.bind(("currency", currency));
        }
        if let Some(starts_on) = input.starts_on {
            builder = builder.bind(("starts_on", format_date(starts_on)));
        }
        if let Some(ends_on) = input.ends_on {
            builder = builder.bind(("ends_on", format_date(ends_on)));
        }
        if let Some(min_nights) = input.min_nights {
            builder = builder.bind(("min_nights", min_nights));
        }
        if let Some(sort_order) = input.sort_order {
            builder = builder.bind(("sort_order", sort_order));
        }

        let mut result = builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<PricingRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_rule()?)
    }

    async fn delete(&self, id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE type::record('pricing_rule', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }

    async fn list_by_property(&self, property_id: Uuid) -> NestResult<Vec<PricingRule>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM pricing_rule \
                 WHERE property_id = $property_id \
                 ORDER BY sort_order ASC, created_at ASC",
            )
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PricingRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(PricingRow::try_into_rule)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn delete_by_property(&self, property_id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE pricing_rule WHERE property_id = $property_id")
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }
}
