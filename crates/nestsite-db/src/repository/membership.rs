//! SurrealDB implementation of [`MembershipRepository`].

use chrono::{DateTime, Utc};
use nestsite_core::error::NestResult;
use nestsite_core::models::membership::{CreateMembership, Membership, MembershipRole};
use nestsite_core::repository::MembershipRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_uuid, single};
use crate::error::DbError;

const ENTITY: &str = "membership";

#[derive(Debug, SurrealValue)]
struct MembershipRow {
    record_id: String,
    user_id: String,
    tenant_id: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MembershipRow {
    fn try_into_membership(self) -> Result<Membership, DbError> {
        let role = MembershipRole::parse(&self.role).ok_or_else(|| DbError::Decode {
            entity: ENTITY.into(),
            message: format!("unknown role: {}", self.role),
        })?;
        Ok(Membership {
            id: parse_uuid(ENTITY, &self.record_id)?,
            user_id: parse_uuid(ENTITY, &self.user_id)?,
            tenant_id: parse_uuid(ENTITY, &self.tenant_id)?,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_memberships(rows: Vec<MembershipRow>) -> Result<Vec<Membership>, DbError> {
    rows.into_iter()
        .map(MembershipRow::try_into_membership)
        .collect()
}

const SELECT_ONE: &str = "SELECT meta::id(id) AS record_id, * \
                          FROM type::record('membership', $id)";

/// SurrealDB implementation of the Membership repository.
///
/// One row per `(user_id, tenant_id)` pair, enforced by a composite
/// UNIQUE index.
#[derive(Clone)]
pub struct SurrealMembershipRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMembershipRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MembershipRepository for SurrealMembershipRepository<C> {
    async fn create(&self, input: CreateMembership) -> NestResult<Membership> {
        let id_str = Uuid::new_v4().to_string();

        let query = format!(
            "CREATE type::record('membership', $id) SET \
             user_id = $user_id, tenant_id = $tenant_id, role = $role; \
             {SELECT_ONE}"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("role", input.role.as_str()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<MembershipRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_membership()?)
    }

    async fn get_by_id(&self, id: Uuid) -> NestResult<Membership> {
        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id)?.try_into_membership()?)
    }

    async fn get(&self, user_id: Uuid, tenant_id: Uuid) -> NestResult<Option<Membership>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM membership \
                 WHERE user_id = $user_id AND tenant_id = $tenant_id",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(MembershipRow::try_into_membership)
            .transpose()?)
    }

    async fn list_by_user(&self, user_id: Uuid) -> NestResult<Vec<Membership>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM membership \
                 WHERE user_id = $user_id ORDER BY created_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_memberships(rows)?)
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> NestResult<Vec<Membership>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM membership \
                 WHERE tenant_id = $tenant_id ORDER BY created_at ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_memberships(rows)?)
    }

    async fn update_role(&self, id: Uuid, role: MembershipRole) -> NestResult<Membership> {
        let query = format!(
            "UPDATE type::record('membership', $id) SET \
             role = $role, updated_at = time::now(); {SELECT_ONE}"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("role", role.as_str()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<MembershipRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id)?.try_into_membership()?)
    }

    async fn delete(&self, id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE type::record('membership', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }

    async fn delete_by_tenant(&self, tenant_id: Uuid) -> NestResult<()> {
        self.db
            .query("DELETE membership WHERE tenant_id = $tenant_id")
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        Ok(())
    }
}
