//! Credential store implementations.

mod app;
mod memory;
mod user;

pub use app::SurrealAppRepository;
pub use memory::MemoryStore;
pub use user::SurrealUserRepository;
