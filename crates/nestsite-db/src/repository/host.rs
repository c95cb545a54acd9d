//! SurrealDB implementation of [`HostRepository`], stored in the
//! `property_host` table.

use chrono::{DateTime, Utc};
use nestsite_core::error::NestResult;
use nestsite_core::models::host::{CreateHost, Host, UpdateHost};
use nestsite_core::repository::HostRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_uuid, single};
use crate::error::DbError;

const ENTITY: &str = "host";

#[derive(Debug, SurrealValue)]
struct HostRow {
    record_id: String,
    property_id: String,
    name: String,
    bio: Option<String>,
    photo_url: Option<String>,
    sort_order: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl HostRow {
    fn try_into_host(self) -> Result<Host, DbError> {
        Ok(Host {
            id: parse_uuid(ENTITY, &self.record_id)?,
            property_id: parse_uuid(ENTITY, &self.property_id)?,
            name: self.name,
            bio: self.bio,
            photo_url: self.photo_url,
            sort_order: self.sort_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ONE: &str = "SELECT meta::id(id) AS record_id, * \
                          FROM type::record('property_host', $id)";

#[derive(Clone)]
pub struct SurrealHostRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealHostRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> HostRepository for SurrealHostRepository<C> {
    async fn create(&self, input: CreateHost) -> NestResult<Host> {
        let id_str = Uuid::new_v4().to_string();

        let query = format!(
            "CREATE type::record('property_host', $id) SET \
             property_id = $property_id, name = $name, bio = $bio, \
             photo_url = $photo_url, sort_order = $sort_order; \
             {SELECT_ONE}"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("name", input.name))
            .bind(("bio", input.bio))
            .bind(("photo_url", input.photo_url))
            .bind(("sort_order", input.sort_order))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<HostRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_host()?)
    }

    async fn get_by_id(&self, id: Uuid) -> NestResult<Host> {
        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HostRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id)?.try_into_host()?)
    }

    async fn update(&self, id: Uuid, input: UpdateHost) -> NestResult<Host> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.bio.is_some() {
            sets.push("bio = $bio");
        }
        if input.photo_url.is_some() {
            sets.push("photo_url = $photo_url");
        }
        if input.sort_order.is_some() {
            sets.push("sort_order = $sort_order");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('property_host', $id) SET {}; {SELECT_ONE}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(bio) = input.bio {
            builder = builder.bind(("bio", bio));
        }
        if let Some(photo_url) = input.photo_url {
            builder = builder.bind(("photo_url", photo_url));
        }
        if let Some(sort_order) = input.sort_order {
            builder = builder.bind(("sort_order", sort_order));
        }

        let mut result = builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<HostRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_host()?)
    }

    async fn delete(&self, id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE type::record('property_host', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }

    async fn list_by_property(&self, property_id: Uuid) -> NestResult<Vec<Host>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM property_host \
                 WHERE property_id = $property_id \
                 ORDER BY sort_order ASC, created_at ASC",
            )
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HostRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(HostRow::try_into_host)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn delete_by_property(&self, property_id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE property_host WHERE property_id = $property_id")
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }
}
