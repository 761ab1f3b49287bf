//! SurrealDB implementation of [`AppProvider`].

use sso_core::error::SsoResult;
use sso_core::models::app::{App, CreateApp};
use sso_core::repository::AppProvider;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AppRowWithId {
    record_id: i64,
    name: String,
    secret: String,
}

impl From<AppRowWithId> for App {
    fn from(row: AppRowWithId) -> Self {
        App {
            id: row.record_id,
            name: row.name,
            secret: row.secret,
        }
    }
}

pub struct SurrealAppRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealAppRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealAppRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Administrative path: register an application under a fixed ID.
    pub async fn create(&self, input: CreateApp) -> SsoResult<App> {
        let key = format!("id={}", input.id);

        let result = self
            .db
            .query(
                "CREATE type::record('app', $id) SET name = $name, secret = $secret \
                 RETURN NONE",
            )
            .bind(("id", input.id))
            .bind(("name", input.name.clone()))
            .bind(("secret", input.secret.clone()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_statement(e, "app", key))?;

        Ok(App {
            id: input.id,
            name: input.name,
            secret: input.secret,
        })
    }
}

impl<C: Connection> AppProvider for SurrealAppRepository<C> {
    async fn app_by_id(&self, id: i64) -> SsoResult<App> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, name, secret \
                 FROM type::record('app', $id)",
            )
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AppRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "app".into(),
            key: format!("id={id}"),
        })?;

        Ok(row.into())
    }
}
