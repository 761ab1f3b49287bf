//! SSO Auth — user registration, password verification, and signed
//! access token issuance scoped to a client application.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::{AuthError, AuthErrorKind};
pub use service::AuthService;
pub use token::{JwtIssuer, TokenClaims, TokenError, TokenIssuer};
