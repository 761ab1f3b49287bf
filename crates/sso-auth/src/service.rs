//! Authentication service — registration and login orchestration.

use std::sync::OnceLock;

use sso_core::error::SsoError;
use sso_core::repository::{AppProvider, UserProvider, UserSaver};
use tracing::{error, info, instrument, warn};

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthErrorKind};
use crate::password::{self, PasswordError};
use crate::token::{JwtIssuer, TokenIssuer};

const OP_REGISTER: &str = "auth.register_new_user";
const OP_LOGIN: &str = "auth.login";

/// Hash checked when the email is unknown, so that path costs the
/// same as a wrong password.
fn dummy_hash() -> Option<&'static str> {
    static HASH: OnceLock<Option<String>> = OnceLock::new();
    HASH.get_or_init(|| password::hash_password("dummy-password", None).ok())
        .as_deref()
}

/// Authentication service.
///
/// Generic over each storage capability and the token issuer so the
/// auth layer has no dependency on a storage technology. Holds no
/// mutable state; one instance serves concurrent calls.
pub struct AuthService<S, U, A, T = JwtIssuer> {
    saver: S,
    users: U,
    apps: A,
    issuer: T,
    config: AuthConfig,
}

impl<S, U, A> AuthService<S, U, A>
where
    S: UserSaver,
    U: UserProvider,
    A: AppProvider,
{
    pub fn new(saver: S, users: U, apps: A, config: AuthConfig) -> Self {
        Self::with_issuer(saver, users, apps, JwtIssuer, config)
    }
}

impl<S, U, A, T> AuthService<S, U, A, T>
where
    S: UserSaver,
    U: UserProvider,
    A: AppProvider,
    T: TokenIssuer,
{
    pub fn with_issuer(saver: S, users: U, apps: A, issuer: T, config: AuthConfig) -> Self {
        Self {
            saver,
            users,
            apps,
            issuer,
            config,
        }
    }

    /// Register a new user and return the assigned ID.
    ///
    /// Input shape (email format, password policy) is validated by the
    /// caller.
    #[instrument(skip_all, fields(op = OP_REGISTER, email = %email))]
    pub async fn register_new_user(&self, email: &str, password: &str) -> Result<i64, AuthError> {
        info!("registering user");

        let password_hash = self.hash(password).await.map_err(|e| {
            error!(error = %e, "failed to generate password hash");
            AuthError::new(OP_REGISTER, AuthErrorKind::HashingFailure).with_source(e)
        })?;

        let id = self
            .saver
            .save_user(email, &password_hash)
            .await
            .map_err(|e| match e {
                SsoError::AlreadyExists { .. } => {
                    warn!("user already exists");
                    AuthError::new(OP_REGISTER, AuthErrorKind::DuplicateUser).with_source(e)
                }
                other => {
                    error!(error = %other, "failed to save user");
                    AuthError::new(OP_REGISTER, AuthErrorKind::StorageFailure).with_source(other)
                }
            })?;

        info!(user_id = id, "user registered");
        Ok(id)
    }

    /// Verify credentials and issue a token for `app_id`.
    ///
    /// An unknown email and a wrong password both fail with
    /// [`AuthErrorKind::InvalidCredentials`]. The application is only
    /// looked up once the credentials are proven.
    #[instrument(skip_all, fields(op = OP_LOGIN, email = %email, app_id = app_id))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        app_id: i64,
    ) -> Result<String, AuthError> {
        info!("attempting to login user");

        let user = match self.users.user_by_email(email).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                warn!("user not found");
                self.verify_dummy(password).await;
                return Err(AuthError::new(OP_LOGIN, AuthErrorKind::InvalidCredentials));
            }
            Err(e) => {
                error!(error = %e, "failed to get user");
                return Err(AuthError::new(OP_LOGIN, AuthErrorKind::StorageFailure).with_source(e));
            }
        };

        match self.verify(password, &user.password_hash).await {
            Ok(true) => {}
            Ok(false) => {
                info!("invalid credentials");
                return Err(AuthError::new(OP_LOGIN, AuthErrorKind::InvalidCredentials));
            }
            Err(VerifyError::Password(e)) => {
                error!(user_id = user.id, error = %e, "stored password hash is unusable");
                return Err(AuthError::new(OP_LOGIN, AuthErrorKind::InvalidCredentials));
            }
            Err(VerifyError::Join(e)) => {
                error!(error = %e, "password verification task failed");
                return Err(AuthError::new(OP_LOGIN, AuthErrorKind::HashingFailure).with_source(e));
            }
        }

        let app = self.apps.app_by_id(app_id).await.map_err(|e| {
            warn!(error = %e, "failed to get app");
            AuthError::new(OP_LOGIN, AuthErrorKind::ApplicationLookupFailure).with_source(e)
        })?;

        info!(user_id = user.id, "user logged in successfully");

        self.issuer
            .issue(&user, &app, self.config.token_ttl())
            .map_err(|e| {
                error!(error = %e, "failed to generate token");
                AuthError::new(OP_LOGIN, AuthErrorKind::SigningFailure).with_source(e)
            })
    }

    /// Argon2 is CPU-bound; run it on the blocking pool.
    async fn hash(&self, password: &str) -> Result<String, HashError> {
        let password = password.to_owned();
        let pepper = self.config.pepper.clone();
        tokio::task::spawn_blocking(move || password::hash_password(&password, pepper.as_deref()))
            .await
            .map_err(HashError::Join)?
            .map_err(HashError::Password)
    }

    async fn verify_dummy(&self, password: &str) {
        let password = password.to_owned();
        let pepper = self.config.pepper.clone();
        let _ = tokio::task::spawn_blocking(move || {
            if let Some(hash) = dummy_hash() {
                let _ = password::verify_password(&password, hash, pepper.as_deref());
            }
        })
        .await;
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, VerifyError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        let pepper = self.config.pepper.clone();
        tokio::task::spawn_blocking(move || {
            password::verify_password(&password, &hash, pepper.as_deref())
        })
        .await
        .map_err(VerifyError::Join)?
        .map_err(VerifyError::Password)
    }
}

#[derive(Debug, thiserror::Error)]
enum HashError {
    #[error("hashing task failed: {0}")]
    Join(tokio::task::JoinError),
    #[error(transparent)]
    Password(PasswordError),
}

enum VerifyError {
    Join(tokio::task::JoinError),
    Password(PasswordError),
}
