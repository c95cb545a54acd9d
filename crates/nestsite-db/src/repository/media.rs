//! SurrealDB implementation of [`MediaRepository`].

use chrono::{DateTime, Utc};
use nestsite_core::error::NestResult;
use nestsite_core::models::media::{CreateMediaAsset, MediaAsset, MediaKind, UpdateMediaAsset};
use nestsite_core::repository::MediaRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_opt_uuid, parse_uuid, single};
use crate::error::DbError;

const ENTITY: &str = "media_asset";

#[derive(Debug, SurrealValue)]
struct MediaRow {
    record_id: String,
    property_id: String,
    room_id: Option<String>,
    kind: String,
    storage_key: Option<String>,
    public_url: String,
    alt_text: Option<String>,
    sort_order: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MediaRow {
    fn try_into_asset(self) -> Result<MediaAsset, DbError> {
        let kind = MediaKind::parse(&self.kind).ok_or_else(|| DbError::Decode {
            entity: ENTITY.into(),
            message: format!("unknown media kind: {}", self.kind),
        })?;
        Ok(MediaAsset {
            id: parse_uuid(ENTITY, &self.record_id)?,
            property_id: parse_uuid(ENTITY, &self.property_id)?,
            room_id: parse_opt_uuid(ENTITY, self.room_id)?,
            kind,
            storage_key: self.storage_key,
            public_url: self.public_url,
            alt_text: self.alt_text,
            sort_order: self.sort_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ONE: &str = "SELECT meta::id(id) AS record_id, * \
                          FROM type::record('media_asset', $id)";

#[derive(Clone)]
pub struct SurrealMediaRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMediaRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MediaRepository for SurrealMediaRepository<C> {
    async fn create(&self, input: CreateMediaAsset) -> NestResult<MediaAsset> {
        let id_str = Uuid::new_v4().to_string();

        let query = format!(
            "CREATE type::record('media_asset', $id) SET \
             property_id = $property_id, room_id = $room_id, \
             kind = $kind, storage_key = $storage_key, \
             public_url = $public_url, alt_text = $alt_text, \
             sort_order = $sort_order; \
             {SELECT_ONE}"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("room_id", input.room_id.map(|id| id.to_string())))
            .bind(("kind", input.kind.as_str()))
            .bind(("storage_key", input.storage_key))
            .bind(("public_url", input.public_url))
            .bind(("alt_text", input.alt_text))
            .bind(("sort_order", input.sort_order))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<MediaRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_asset()?)
    }

    async fn get_by_id(&self, id: Uuid) -> NestResult<MediaAsset> {
        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MediaRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id)?.try_into_asset()?)
    }

    async fn update(&self, id: Uuid, input: UpdateMediaAsset) -> NestResult<MediaAsset> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.room_id.is_some() {
            sets.push("room_id = $room_id");
        }
        if input.alt_text.is_some() {
            sets.push("alt_text = $alt_text");
        }
        if input.sort_order.is_some() {
            sets.push("sort_order = $sort_order");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('media_asset', $id) SET {}; {SELECT_ONE}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(room_id) = input.room_id {
            builder = builder.bind(("room_id", room_id.map(|id| id.to_string())));
        }
        if let Some(alt_text) = input.alt_text {
            builder = builder.bind(("alt_text", alt_text));
        }
        if let Some(sort_order) = input.sort_order {
            builder = builder.bind(("sort_order", sort_order));
        }

        let mut result = builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<MediaRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_asset()?)
    }

    async fn delete(&self, id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE type::record('media_asset', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }

    async fn list_by_property(&self, property_id: Uuid) -> NestResult<Vec<MediaAsset>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM media_asset \
                 WHERE property_id = $property_id \
                 ORDER BY sort_order ASC, created_at ASC",
            )
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MediaRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(MediaRow::try_into_asset)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn delete_by_property(&self, property_id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE media_asset WHERE property_id = $property_id")
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }
}
