//! User domain model.

use serde::{Deserialize, Serialize};

/// A registered user. Only the password hash is ever stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Assigned by the store on creation.
    pub id: i64,
    /// Unique, compared byte-for-byte.
    pub email: String,
    /// Argon2id PHC string (salt embedded).
    pub password_hash: String,
}
