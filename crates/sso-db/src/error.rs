//! Database-specific error types and conversions.

use sso_core::error::SsoError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with {key}")]
    NotFound { entity: String, key: String },

    #[error("Record already exists: {entity} with {key}")]
    Conflict { entity: String, key: String },
}

impl DbError {
    /// Classify a failed statement. SurrealDB reports unique index
    /// violations and existing record IDs only through the message.
    pub(crate) fn from_statement(
        err: impl std::fmt::Display,
        entity: &str,
        key: impl Into<String>,
    ) -> Self {
        let msg = err.to_string();
        if msg.contains("already contains") || msg.contains("already exists") {
            DbError::Conflict {
                entity: entity.into(),
                key: key.into(),
            }
        } else {
            DbError::Query(msg)
        }
    }
}

impl From<DbError> for SsoError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, key } => SsoError::NotFound { entity, key },
            DbError::Conflict { entity, key } => SsoError::AlreadyExists { entity, key },
            other => SsoError::Database(other.to_string()),
        }
    }
}
