//! Storage-level error types shared by every store implementation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SsoError {
    #[error("Entity not found: {entity} with {key}")]
    NotFound { entity: String, key: String },

    #[error("Entity already exists: {entity} with {key}")]
    AlreadyExists { entity: String, key: String },

    #[error("Database error: {0}")]
    Database(String),
}

impl SsoError {
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    pub fn already_exists(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            key: key.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type SsoResult<T> = Result<T, SsoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_key() {
        let err = SsoError::not_found("user", "email=a@x.com");
        assert_eq!(
            err.to_string(),
            "Entity not found: user with email=a@x.com"
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn conflict_is_not_a_lookup_miss() {
        assert!(!SsoError::already_exists("user", "email=a@x.com").is_not_found());
    }
}
