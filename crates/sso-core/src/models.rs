//! Domain models for the SSO service.

pub mod app;
pub mod user;
