//! Capability traits for credential storage.
//!
//! Each capability is its own trait so the auth layer declares exactly
//! what it consumes and tests can substitute one capability at a time.
//! All operations are async; dropping a returned future abandons the
//! call.

use crate::error::SsoResult;
use crate::models::{app::App, user::User};

/// Persists new users.
pub trait UserSaver: Send + Sync {
    /// Insert a user and return the assigned ID.
    ///
    /// IDs are unique but not guaranteed contiguous: a failed insert may
    /// consume one.
    ///
    /// Must fail with [`SsoError::AlreadyExists`](crate::SsoError::AlreadyExists)
    /// when the email is taken, including when two inserts for the same
    /// email race.
    fn save_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> impl Future<Output = SsoResult<i64>> + Send;
}

/// Looks up users by email.
pub trait UserProvider: Send + Sync {
    /// Exact-match lookup. Fails with `NotFound` when absent.
    fn user_by_email(&self, email: &str) -> impl Future<Output = SsoResult<User>> + Send;
}

/// Looks up applications by ID.
pub trait AppProvider: Send + Sync {
    fn app_by_id(&self, id: i64) -> impl Future<Output = SsoResult<App>> + Send;
}

impl<T: UserSaver> UserSaver for std::sync::Arc<T> {
    fn save_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> impl Future<Output = SsoResult<i64>> + Send {
        (**self).save_user(email, password_hash)
    }
}

impl<T: UserProvider> UserProvider for std::sync::Arc<T> {
    fn user_by_email(&self, email: &str) -> impl Future<Output = SsoResult<User>> + Send {
        (**self).user_by_email(email)
    }
}

impl<T: AppProvider> AppProvider for std::sync::Arc<T> {
    fn app_by_id(&self, id: i64) -> impl Future<Output = SsoResult<App>> + Send {
        (**self).app_by_id(id)
    }
}
