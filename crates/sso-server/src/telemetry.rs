//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::Env;

fn default_directives(env: Env) -> &'static str {
    match env {
        Env::Local | Env::Dev => "info,sso_server=debug,sso_auth=debug,sso_db=debug",
        Env::Prod => "info",
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the tier's
/// default level. Local output is human-readable; dev and prod emit
/// JSON.
pub fn init(env: Env) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(env)));

    match env {
        Env::Local => tracing_subscriber::fmt().with_env_filter(filter).init(),
        Env::Dev | Env::Prod => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
    }
}
