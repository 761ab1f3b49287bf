//! SSO Core — domain models, storage errors, and the capability
//! traits the authentication layer consumes.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{SsoError, SsoResult};
pub use models::app::{App, CreateApp};
pub use models::user::User;
pub use repository::{AppProvider, UserProvider, UserSaver};
