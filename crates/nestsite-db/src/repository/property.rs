//! SurrealDB implementation of [`PropertyRepository`].

use chrono::{DateTime, Utc};
use nestsite_core::error::NestResult;
use nestsite_core::models::property::{
    CreateProperty, Property, PropertyStatus, UpdateProperty,
};
use nestsite_core::models::theme::Theme;
use nestsite_core::repository::{PaginatedResult, Pagination, PropertyRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid, single};
use crate::error::DbError;

const ENTITY: &str = "property";

#[derive(Debug, SurrealValue)]
struct PropertyRow {
    record_id: String,
    tenant_id: String,
    slug: String,
    name: String,
    tagline: Option<String>,
    description: Option<String>,
    address: Option<String>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    check_in_time: Option<String>,
    check_out_time: Option<String>,
    theme: String,
    status: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PropertyRow {
    fn try_into_property(self) -> Result<Property, DbError> {
        let theme = Theme::parse(&self.theme).ok_or_else(|| DbError::Decode {
            entity: ENTITY.into(),
            message: format!("unknown theme: {}", self.theme),
        })?;
        let status = PropertyStatus::parse(&self.status).ok_or_else(|| DbError::Decode {
            entity: ENTITY.into(),
            message: format!("unknown status: {}", self.status),
        })?;
        Ok(Property {
            id: parse_uuid(ENTITY, &self.record_id)?,
            tenant_id: parse_uuid(ENTITY, &self.tenant_id)?,
            slug: self.slug,
            name: self.name,
            tagline: self.tagline,
            description: self.description,
            address: self.address,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            check_in_time: self.check_in_time,
            check_out_time: self.check_out_time,
            theme,
            status,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ONE: &str = "SELECT meta::id(id) AS record_id, * \
                          FROM type::record('property', $id)";

/// SurrealDB implementation of the Property repository.
#[derive(Clone)]
pub struct SurrealPropertyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPropertyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PropertyRepository for SurrealPropertyRepository<C> {
    async fn create(&self, input: CreateProperty) -> NestResult<Property> {
        let id_str = Uuid::new_v4().to_string();

        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));
        let theme = input.theme.unwrap_or_default();
        let status = input.status.unwrap_or_default();

        let query = format!(
            "CREATE type::record('property', $id) SET \
             tenant_id = $tenant_id, slug = $slug, name = $name, \
             tagline = $tagline, description = $description, \
             address = $address, contact_email = $contact_email, \
             contact_phone = $contact_phone, \
             check_in_time = $check_in_time, \
             check_out_time = $check_out_time, \
             theme = $theme, status = $status, metadata = $metadata; \
             {SELECT_ONE}"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("slug", input.slug))
            .bind(("name", input.name))
            .bind(("tagline", input.tagline))
            .bind(("description", input.description))
            .bind(("address", input.address))
            .bind(("contact_email", input.contact_email))
            .bind(("contact_phone", input.contact_phone))
            .bind(("check_in_time", input.check_in_time))
            .bind(("check_out_time", input.check_out_time))
            .bind(("theme", theme.as_str()))
            .bind(("status", status.as_str()))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<PropertyRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_property()?)
    }

    async fn get_by_id(&self, id: Uuid) -> NestResult<Property> {
        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id)?.try_into_property()?)
    }

    async fn get_by_slug(&self, tenant_id: Uuid, slug: &str) -> NestResult<Property> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM property \
                 WHERE tenant_id = $tenant_id AND slug = $slug",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, format!("slug={slug}"))?.try_into_property()?)
    }

    async fn update(&self, id: Uuid, input: UpdateProperty) -> NestResult<Property> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.slug.is_some() {
            sets.push("slug = $slug");
        }
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.tagline.is_some() {
            sets.push("tagline = $tagline");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.address.is_some() {
            sets.push("address = $address");
        }
        if input.contact_email.is_some() {
            sets.push("contact_email = $contact_email");
        }
        if input.contact_phone.is_some() {
            sets.push("contact_phone = $contact_phone");
        }
        if input.check_in_time.is_some() {
            sets.push("check_in_time = $check_in_time");
        }
        if input.check_out_time.is_some() {
            sets.push("check_out_time = $check_out_time");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.metadata.is_some() {
            sets.push("metadata = $metadata");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('property', $id) SET {}; {SELECT_ONE}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(slug) = input.slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        // Option<Option<String>>: Some(None) clears the field.
        if let Some(tagline) = input.tagline {
            builder = builder.bind(("tagline", tagline));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(address) = input.address {
            builder = builder.bind(("address", address));
        }
        if let Some(contact_email) = input.contact_email {
            builder = builder.bind(("contact_email", contact_email));
        }
        if let Some(contact_phone) = input.contact_phone {
            builder = builder.bind(("contact_phone", contact_phone));
        }
        if let Some(check_in_time) = input.check_in_time {
            builder = builder.bind(("check_in_time", check_in_time));
        }
        if let Some(check_out_time) = input.check_out_time {
            builder = builder.bind(("check_out_time", check_out_time));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str()));
        }
        if let Some(metadata) = input.metadata {
            builder = builder.bind(("metadata", metadata));
        }

        let mut result = builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<PropertyRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_property()?)
    }

    async fn set_theme(&self, id: Uuid, theme: Theme) -> NestResult<Property> {
        let query = format!(
            "UPDATE type::record('property', $id) SET \
             theme = $theme, updated_at = time::now(); {SELECT_ONE}"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("theme", theme.as_str()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<PropertyRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id)?.try_into_property()?)
    }

    async fn delete(&self, id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE type::record('property', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> NestResult<PaginatedResult<Property>> {
        let tenant_str = tenant_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM property \
                 WHERE tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM property \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(PropertyRow::try_into_property)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
