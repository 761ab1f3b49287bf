//! SSO Database — credential store implementations.
//!
//! This crate provides:
//! - An in-process reference store ([`MemoryStore`])
//! - SurrealDB connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - SurrealDB repositories for users and applications
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::{MemoryStore, SurrealAppRepository, SurrealUserRepository};
pub use schema::{run_migrations, schema_v1};
