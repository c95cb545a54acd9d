//! Database-specific error types and conversions.

use nestsite_core::error::NestError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Unique constraint violated on {entity}")]
    Conflict { entity: String },

    #[error("Malformed {entity} row: {message}")]
    Decode { entity: String, message: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// Classify a failed statement; unique-index violations become
    /// [`DbError::Conflict`].
    pub(crate) fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            DbError::Conflict {
                entity: entity.into(),
            }
        } else {
            DbError::Query(message)
        }
    }
}

impl From<DbError> for NestError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => NestError::NotFound { entity, id },
            DbError::Conflict { entity } => NestError::AlreadyExists { entity },
            other => NestError::Database(other.to_string()),
        }
    }
}
