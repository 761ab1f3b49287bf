//! In-process reference implementation of the credential store.
//!
//! User IDs are assigned sequentially from 1. Email uniqueness is
//! checked and the record inserted under one write lock, so of two
//! racing registrations for the same email exactly one succeeds.

use std::collections::HashMap;
use std::sync::Arc;

use sso_core::error::{SsoError, SsoResult};
use sso_core::models::app::{App, CreateApp};
use sso_core::models::user::User;
use sso_core::repository::{AppProvider, UserProvider, UserSaver};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    last_user_id: i64,
    apps: HashMap<i64, App>,
}

/// Thread-safe in-memory store. Clones share the same tables.
#[derive(Default, Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Administrative path: register an application.
    pub async fn create_app(&self, input: CreateApp) -> SsoResult<App> {
        let mut tables = self.tables.write().await;
        if tables.apps.contains_key(&input.id) {
            return Err(SsoError::already_exists("app", format!("id={}", input.id)));
        }
        let app = App {
            id: input.id,
            name: input.name,
            secret: input.secret,
        };
        tables.apps.insert(app.id, app.clone());
        Ok(app)
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

impl UserSaver for MemoryStore {
    async fn save_user(&self, email: &str, password_hash: &str) -> SsoResult<i64> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(email) {
            return Err(SsoError::already_exists("user", format!("email={email}")));
        }
        tables.last_user_id += 1;
        let id = tables.last_user_id;
        tables.users.insert(
            email.to_string(),
            User {
                id,
                email: email.to_string(),
                password_hash: password_hash.to_string(),
            },
        );
        debug!(user_id = id, "user stored");
        Ok(id)
    }
}

impl UserProvider for MemoryStore {
    async fn user_by_email(&self, email: &str) -> SsoResult<User> {
        self.tables
            .read()
            .await
            .users
            .get(email)
            .cloned()
            .ok_or_else(|| SsoError::not_found("user", format!("email={email}")))
    }
}

impl AppProvider for MemoryStore {
    async fn app_by_id(&self, id: i64) -> SsoResult<App> {
        self.tables
            .read()
            .await
            .apps
            .get(&id)
            .cloned()
            .ok_or_else(|| SsoError::not_found("app", format!("id={id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_sequential_from_one() {
        let store = MemoryStore::new();
        assert_eq!(store.save_user("a@x.com", "h1").await.unwrap(), 1);
        assert_eq!(store.save_user("b@x.com", "h2").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.save_user("a@x.com", "h1").await.unwrap();

        let err = store.save_user("a@x.com", "h2").await.unwrap_err();
        assert!(matches!(err, SsoError::AlreadyExists { .. }));
        assert_eq!(store.user_count().await, 1);
        assert_eq!(
            store.user_by_email("a@x.com").await.unwrap().password_hash,
            "h1"
        );
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let store = MemoryStore::new();
        store.save_user("a@x.com", "h1").await.unwrap();

        let err = store.user_by_email("A@x.com").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn concurrent_duplicates_yield_one_record() {
        let store = MemoryStore::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.save_user("race@x.com", &format!("h{i}")).await })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert!(matches!(e, SsoError::AlreadyExists { .. })),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn apps_are_found_by_id() {
        let store = MemoryStore::new();
        store
            .create_app(CreateApp {
                id: 7,
                name: "portal".into(),
                secret: "s".into(),
            })
            .await
            .unwrap();

        assert_eq!(store.app_by_id(7).await.unwrap().name, "portal");
        assert!(store.app_by_id(8).await.unwrap_err().is_not_found());
    }
}
