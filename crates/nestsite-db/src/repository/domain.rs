//! SurrealDB implementation of [`DomainRepository`].
//!
//! Stored in the `site_domain` table. Hostnames are globally unique and
//! always written in normalized form by the service layer.

use chrono::{DateTime, Utc};
use nestsite_core::error::NestResult;
use nestsite_core::models::domain::{CreateDomain, Domain};
use nestsite_core::repository::DomainRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_uuid, single};
use crate::error::DbError;

const ENTITY: &str = "domain";

#[derive(Debug, SurrealValue)]
struct DomainRow {
    record_id: String,
    property_id: String,
    tenant_id: String,
    hostname: String,
    is_primary: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DomainRow {
    fn try_into_domain(self) -> Result<Domain, DbError> {
        Ok(Domain {
            id: parse_uuid(ENTITY, &self.record_id)?,
            property_id: parse_uuid(ENTITY, &self.property_id)?,
            tenant_id: parse_uuid(ENTITY, &self.tenant_id)?,
            hostname: self.hostname,
            is_primary: self.is_primary,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ONE: &str = "SELECT meta::id(id) AS record_id, * \
                          FROM type::record('site_domain', $id)";

#[derive(Clone)]
pub struct SurrealDomainRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDomainRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DomainRepository for SurrealDomainRepository<C> {
    async fn create(&self, input: CreateDomain) -> NestResult<Domain> {
        let id_str = Uuid::new_v4().to_string();

        let query = format!(
            "CREATE type::record('site_domain', $id) SET \
             property_id = $property_id, tenant_id = $tenant_id, \
             hostname = $hostname, is_primary = $is_primary; \
             {SELECT_ONE}"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("hostname", input.hostname))
            .bind(("is_primary", input.is_primary))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<DomainRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_domain()?)
    }

    async fn get_by_id(&self, id: Uuid) -> NestResult<Domain> {
        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DomainRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id)?.try_into_domain()?)
    }

    async fn get_by_hostname(&self, hostname: &str) -> NestResult<Option<Domain>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM site_domain \
                 WHERE hostname = $hostname",
            )
            .bind(("hostname", hostname.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DomainRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(DomainRow::try_into_domain)
            .transpose()?)
    }

    async fn list_by_property(&self, property_id: Uuid) -> NestResult<Vec<Domain>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM site_domain \
                 WHERE property_id = $property_id \
                 ORDER BY is_primary DESC, hostname ASC",
            )
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DomainRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(DomainRow::try_into_domain)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn clear_primary(&self, property_id: Uuid) -> NestResult<()> {
        self.db
            .query(
                "UPDATE site_domain SET is_primary = false, \
                 updated_at = time::now() \
                 WHERE property_id = $property_id AND is_primary = true",
            )
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }

    async fn set_primary(&self, id: Uuid, is_primary: bool) -> NestResult<Domain> {
        let query = format!(
            "UPDATE type::record('site_domain', $id) SET \
             is_primary = $is_primary, updated_at = time::now(); \
             {SELECT_ONE}"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("is_primary", is_primary))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<DomainRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id)?.try_into_domain()?)
    }

    async fn delete(&self, id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE type::record('site_domain', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }

    async fn delete_by_property(&self, property_id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE site_domain WHERE property_id = $property_id")
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }
}
