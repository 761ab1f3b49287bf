//! Application domain model.

use serde::{Deserialize, Serialize};

/// A client application that users sign in to.
///
/// Tokens issued for an application are signed with its own `secret`,
/// so one application's secret cannot validate another's tokens.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub id: i64,
    pub name: String,
    pub secret: String,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Input for the administrative application registration path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApp {
    pub id: i64,
    pub name: String,
    pub secret: String,
}
