//! SurrealDB implementation of [`UserSaver`] and [`UserProvider`].

use sso_core::error::SsoResult;
use sso_core::models::user::User;
use sso_core::repository::{UserProvider, UserSaver};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;

use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: i64,
    email: String,
    password_hash: String,
}

impl From<UserRowWithId> for User {
    fn from(row: UserRowWithId) -> Self {
        User {
            id: row.record_id,
            email: row.email,
            password_hash: row.password_hash,
        }
    }
}

/// SurrealDB implementation of the user capabilities.
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealUserRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, email, password_hash \
                 FROM user WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await?;

        let rows: Vec<UserRowWithId> = result.take(0)?;
        Ok(rows.into_iter().next().map(User::from))
    }
}

impl<C: Connection> UserSaver for SurrealUserRepository<C> {
    async fn save_user(&self, email: &str, password_hash: &str) -> SsoResult<i64> {
        let key = format!("email={email}");

        // The sequence value is spent even if the insert then fails.
        let result = self
            .db
            .query(
                "LET $uid = sequence::nextval('user_seq'); \
                 CREATE type::record('user', $uid) SET \
                 email = $email, password_hash = $password_hash; \
                 RETURN $uid;",
            )
            .bind(("email", email.to_string()))
            .bind(("password_hash", password_hash.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = match result.check() {
            Ok(result) => result,
            Err(e) => {
                let err = DbError::from_statement(e, "user", key.clone());
                // A write conflict between two racing inserts does not
                // always surface as an index violation.
                if matches!(err, DbError::Query(_)) && self.find_by_email(email).await?.is_some() {
                    return Err(DbError::Conflict {
                        entity: "user".into(),
                        key,
                    }
                    .into());
                }
                return Err(err.into());
            }
        };

        let id: Option<i64> = result.take(2).map_err(DbError::from)?;
        let id = id.ok_or_else(|| DbError::Query(format!("no id returned for {key}")))?;
        debug!(user_id = id, "user stored");
        Ok(id)
    }
}

impl<C: Connection> UserProvider for SurrealUserRepository<C> {
    async fn user_by_email(&self, email: &str) -> SsoResult<User> {
        let user = self.find_by_email(email).await?;
        Ok(user.ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            key: format!("email={email}"),
        })?)
    }
}
