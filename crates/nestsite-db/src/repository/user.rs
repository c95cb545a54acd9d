//! SurrealDB implementation of [`UserRepository`].
//!
//! Users are global: one account per email address, linked to tenants
//! through memberships. Password and invite-token hashing happen in the
//! auth layer; this repository only stores the resulting hashes.

use chrono::{DateTime, Utc};
use nestsite_core::error::NestResult;
use nestsite_core::models::user::{CreateUser, UpdateUser, User, UserStatus};
use nestsite_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_opt_uuid, parse_uuid, single};
use crate::error::DbError;

const ENTITY: &str = "user";

#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    email: String,
    display_name: Option<String>,
    phone: Option<String>,
    password_hash: Option<String>,
    status: String,
    agency_id: Option<String>,
    invite_token_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        let status = UserStatus::parse(&self.status).ok_or_else(|| DbError::Decode {
            entity: ENTITY.into(),
            message: format!("unknown user status: {}", self.status),
        })?;
        Ok(User {
            id: parse_uuid(ENTITY, &self.record_id)?,
            email: self.email,
            display_name: self.display_name,
            phone: self.phone,
            password_hash: self.password_hash,
            status,
            agency_id: parse_opt_uuid(ENTITY, self.agency_id)?,
            invite_token_hash: self.invite_token_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ONE: &str = "SELECT meta::id(id) AS record_id, * \
                          FROM type::record('user', $id)";

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_one(&self, field: &'static str, value: String) -> NestResult<Option<User>> {
        let query =
            format!("SELECT meta::id(id) AS record_id, * FROM user WHERE {field} = $value");
        let mut result = self
            .db
            .query(&query)
            .bind(("value", value))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(UserRow::try_into_user)
            .transpose()?)
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> NestResult<User> {
        let id_str = Uuid::new_v4().to_string();

        let query = format!(
            "CREATE type::record('user', $id) SET \
             email = $email, display_name = $display_name, \
             phone = $phone, password_hash = $password_hash, \
             status = $status, agency_id = $agency_id, \
             invite_token_hash = $invite_token_hash; \
             {SELECT_ONE}"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("display_name", input.display_name))
            .bind(("phone", input.phone))
            .bind(("password_hash", input.password_hash))
            .bind(("status", input.status.as_str()))
            .bind(("agency_id", input.agency_id.map(|id| id.to_string())))
            .bind(("invite_token_hash", input.invite_token_hash))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_user()?)
    }

    async fn get_by_id(&self, id: Uuid) -> NestResult<User> {
        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id)?.try_into_user()?)
    }

    async fn get_by_email(&self, email: &str) -> NestResult<Option<User>> {
        self.find_one("email", email.to_string()).await
    }

    async fn get_by_invite_token_hash(&self, token_hash: &str) -> NestResult<Option<User>> {
        self.find_one("invite_token_hash", token_hash.to_string())
            .await
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> NestResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.display_name.is_some() {
            sets.push("display_name = $display_name");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.password_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.invite_token_hash.is_some() {
            sets.push("invite_token_hash = $invite_token_hash");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}; {SELECT_ONE}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(display_name) = input.display_name {
            builder = builder.bind(("display_name", display_name));
        }
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(password_hash) = input.password_hash {
            builder = builder.bind(("password_hash", password_hash));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str()));
        }
        if let Some(invite_token_hash) = input.invite_token_hash {
            // Some(None) clears a consumed invite.
            builder = builder.bind(("invite_token_hash", invite_token_hash));
        }

        let mut result = builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement(ENTITY, e))?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        Ok(single(rows, ENTITY, id_str)?.try_into_user()?)
    }
}
