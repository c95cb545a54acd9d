//! SurrealDB implementation of [`ContentRepository`].
//!
//! Blocks live in `content_block`, keyed by `(property_id, block_key)`.

use chrono::{DateTime, Utc};
use nestsite_core::error::NestResult;
use nestsite_core::models::content::ContentBlock;
use nestsite_core::repository::ContentRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_uuid, single};
use crate::error::DbError;

const ENTITY: &str = "content_block";

#[derive(Debug, SurrealValue)]
struct ContentRow {
    record_id: String,
    property_id: String,
    block_key: String,
    data: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContentRow {
    fn try_into_block(self) -> Result<ContentBlock, DbError> {
        Ok(ContentBlock {
            id: parse_uuid(ENTITY, &self.record_id)?,
            property_id: parse_uuid(ENTITY, &self.property_id)?,
            key: self.block_key,
            value: self.data,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ONE: &str = "SELECT meta::id(id) AS record_id, * \
                          FROM type::record('content_block', $id)";

#[derive(Clone)]
pub struct SurrealContentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealContentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ContentRepository for SurrealContentRepository<C> {
    async fn upsert(
        &self,
        property_id: Uuid,
        key: &str,
        value: serde_json::Value,
    ) -> NestResult<ContentBlock> {
        let (id_str, statement) = match self.get(property_id, key).await? {
            Some(existing) => (
                existing.id.to_string(),
                "UPDATE type::record('content_block', $id) SET \
                 data = $data, updated_at = time::now()",
            ),
            None => (
                Uuid::new_v4().to_string(),
                "CREATE type::record('content_block', $id) SET \
                 property_id = $property_id, block_key = $block_key, \
                 data = $data",
            ),
        };

        let query = format!("{statement}; {SELECT_ONE}");

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("property_id", property_id.to_string()))
            .bind(("block_key", key.to_string()))
            .bind(("data", value))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<ContentRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_block()?)
    }

    async fn get(&self, property_id: Uuid, key: &str) -> NestResult<Option<ContentBlock>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM content_block \
                 WHERE property_id = $property_id AND block_key = $block_key",
            )
            .bind(("property_id", property_id.to_string()))
            .bind(("block_key", key.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ContentRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(ContentRow::try_into_block)
            .transpose()?)
    }

    async fn list_by_property(&self, property_id: Uuid) -> NestResult<Vec<ContentBlock>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM content_block \
                 WHERE property_id = $property_id ORDER BY block_key ASC",
            )
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ContentRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(ContentRow::try_into_block)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn delete(&self, property_id: Uuid, key: &str) -> NestResult<()> {
        self.db
            .query(
                "DELETE content_block \
                 WHERE property_id = $property_id AND block_key = $block_key",
            )
            .bind(("property_id", property_id.to_string()))
            .bind(("block_key", key.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }

    async fn delete_by_property(&self, property_id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE content_block WHERE property_id = $property_id")
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }
}
