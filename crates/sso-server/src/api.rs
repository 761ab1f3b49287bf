//! JSON-over-HTTP transport for `Register` and `Login`.
//!
//! Validates input shape, then maps [`AuthErrorKind`] onto HTTP status
//! codes. Error bodies carry only a fixed message per status.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde::{Deserialize, Serialize};
use sso_auth::{AuthError, AuthErrorKind, AuthService};
use sso_core::repository::{AppProvider, UserProvider, UserSaver};
use tracing::debug;

type SharedService<S, U, A> = Arc<AuthService<S, U, A>>;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub app_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidArgument(&'static str),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, *msg),
            ApiError::Auth(err) => match err.kind() {
                AuthErrorKind::DuplicateUser => (StatusCode::CONFLICT, "user already exists"),
                AuthErrorKind::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "invalid email or password")
                }
                AuthErrorKind::ApplicationLookupFailure
                | AuthErrorKind::HashingFailure
                | AuthErrorKind::SigningFailure
                | AuthErrorKind::StorageFailure => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
                }
            },
        };
        debug!(status = status.as_u16(), error = %self, "request failed");
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::InvalidArgument("email is required"));
    }
    if !email.contains('@') {
        return Err(ApiError::InvalidArgument("email is malformed"));
    }
    if password.is_empty() {
        return Err(ApiError::InvalidArgument("password is required"));
    }
    Ok(())
}

pub async fn register<S, U, A>(
    State(svc): State<SharedService<S, U, A>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError>
where
    S: UserSaver + 'static,
    U: UserProvider + 'static,
    A: AppProvider + 'static,
{
    validate_credentials(&req.email, &req.password)?;
    let user_id = svc.register_new_user(&req.email, &req.password).await?;
    Ok(Json(RegisterResponse { user_id }))
}

pub async fn login<S, U, A>(
    State(svc): State<SharedService<S, U, A>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError>
where
    S: UserSaver + 'static,
    U: UserProvider + 'static,
    A: AppProvider + 'static,
{
    validate_credentials(&req.email, &req.password)?;
    if req.app_id == 0 {
        return Err(ApiError::InvalidArgument("app_id is required"));
    }
    let token = svc.login(&req.email, &req.password, req.app_id).await?;
    Ok(Json(LoginResponse { token }))
}

pub fn router<S, U, A>(svc: SharedService<S, U, A>) -> Router
where
    S: UserSaver + 'static,
    U: UserProvider + 'static,
    A: AppProvider + 'static,
{
    Router::new()
        .route("/register", post(register::<S, U, A>))
        .route("/login", post(login::<S, U, A>))
        .with_state(svc)
}
