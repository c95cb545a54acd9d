//! SurrealDB implementation of [`AgencyRepository`].

use chrono::{DateTime, Utc};
use nestsite_core::error::NestResult;
use nestsite_core::models::agency::{Agency, CreateAgency, UpdateAgency};
use nestsite_core::repository::{AgencyRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid, single};
use crate::error::DbError;

const ENTITY: &str = "agency";

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AgencyRow {
    record_id: String,
    name: String,
    slug: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AgencyRow {
    fn try_into_agency(self) -> Result<Agency, DbError> {
        Ok(Agency {
            id: parse_uuid(ENTITY, &self.record_id)?,
            name: self.name,
            slug: self.slug,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Agency repository.
#[derive(Clone)]
pub struct SurrealAgencyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAgencyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AgencyRepository for SurrealAgencyRepository<C> {
    async fn create(&self, input: CreateAgency) -> NestResult<Agency> {
        let id_str = Uuid::new_v4().to_string();

        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let mut result = self
            .db
            .query(
                "CREATE type::record('agency', $id) SET \
                 name = $name, slug = $slug, metadata = $metadata; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('agency', $id)",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<AgencyRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_agency()?)
    }

    async fn get_by_id(&self, id: Uuid) -> NestResult<Agency> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('agency', $id)",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AgencyRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id)?.try_into_agency()?)
    }

    async fn get_by_slug(&self, slug: &str) -> NestResult<Agency> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM agency WHERE slug = $slug",
            )
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AgencyRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, format!("slug={slug}"))?.try_into_agency()?)
    }

    async fn update(&self, id: Uuid, input: UpdateAgency) -> NestResult<Agency> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.slug.is_some() {
            sets.push("slug = $slug");
        }
        if input.metadata.is_some() {
            sets.push("metadata = $metadata");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('agency', $id) SET {}; \
             SELECT meta::id(id) AS record_id, * \
             FROM type::record('agency', $id)",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(slug) = input.slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(metadata) = input.metadata {
            builder = builder.bind(("metadata", metadata));
        }

        let mut result = builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<AgencyRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_agency()?)
    }

    async fn delete(&self, id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE type::record('agency', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> NestResult<PaginatedResult<Agency>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM agency GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM agency \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AgencyRow> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(AgencyRow::try_into_agency)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
