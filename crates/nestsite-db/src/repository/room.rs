//! SurrealDB implementation of [`RoomRepository`].

use chrono::{DateTime, Utc};
use nestsite_core::error::NestResult;
use nestsite_core::models::room::{CreateRoom, Room, UpdateRoom};
use nestsite_core::repository::RoomRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_uuid, single};
use crate::error::DbError;

const ENTITY: &str = "room";

#[derive(Debug, SurrealValue)]
struct RoomRow {
    record_id: String,
    property_id: String,
    name: String,
    slug: String,
    description: Option<String>,
    capacity: u32,
    beds: u32,
    sort_order: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoomRow {
    fn try_into_room(self) -> Result<Room, DbError> {
        Ok(Room {
            id: parse_uuid(ENTITY, &self.record_id)?,
            property_id: parse_uuid(ENTITY, &self.property_id)?,
            name: self.name,
            slug: self.slug,
            description: self.description,
            capacity: self.capacity,
            beds: self.beds,
            sort_order: self.sort_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ONE: &str = "SELECT meta::id(id) AS record_id, * \
                          FROM type::record('room', $id)";

#[derive(Clone)]
pub struct SurrealRoomRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoomRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoomRepository for SurrealRoomRepository<C> {
    async fn create(&self, input: CreateRoom) -> NestResult<Room> {
        let id_str = Uuid::new_v4().to_string();

        let query = format!(
            "CREATE type::record('room', $id) SET \
             property_id = $property_id, name = $name, slug = $slug, \
             description = $description, capacity = $capacity, \
             beds = $beds, sort_order = $sort_order; \
             {SELECT_ONE}"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("description", input.description))
            .bind(("capacity", input.capacity))
            .bind(("beds", input.beds))
            .bind(("sort_order", input.sort_order))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<RoomRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_room()?)
    }

    async fn get_by_id(&self, id: Uuid) -> NestResult<Room> {
        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoomRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id)?.try_into_room()?)
    }

    async fn update(&self, id: Uuid, input: UpdateRoom) -> NestResult<Room> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.capacity.is_some() {
            sets.push("capacity = $capacity");
        }
        if input.beds.is_some() {
            sets.push("beds = $beds");
        }
        if input.sort_order.is_some() {
            sets.push("sort_order = $sort_order");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('room', $id) SET {}; {SELECT_ONE}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(capacity) = input.capacity {
            builder = builder.bind(("capacity", capacity));
        }
        if let Some(beds) = input.beds {
            builder = builder.bind(("beds", beds));
        }
        if let Some(sort_order) = input.sort_order {
            builder = builder.bind(("sort_order", sort_order));
        }

        let mut result = builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<RoomRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_room()?)
    }

    async fn delete(&self, id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE type::record('room', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }

    async fn list_by_property(&self, property_id: Uuid) -> NestResult<Vec<Room>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM room \
                 WHERE property_id = $property_id \
                 ORDER BY sort_order ASC, created_at ASC",
            )
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoomRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(RoomRow::try_into_room)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn delete_by_property(&self, property_id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE room WHERE property_id = $property_id")
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }
}
