//! SSO Server — application entry point.

mod api;
mod config;
mod telemetry;

use std::net::SocketAddr;
use std::sync::Arc;

use sso_auth::AuthService;
use sso_db::{DbManager, SurrealAppRepository, SurrealUserRepository};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    telemetry::init(config.env);

    info!(env = %config.env, "starting sso server");
    info!(?config, "loaded configuration");

    // The service cannot run without its store.
    let db = match DbManager::connect(&config.db).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "failed to connect to credential store");
            std::process::exit(1);
        }
    };
    if let Err(e) = sso_db::run_migrations(db.client()).await {
        error!(error = %e, "failed to migrate credential store");
        std::process::exit(1);
    }

    let users = SurrealUserRepository::new(db.client().clone());
    let apps = SurrealAppRepository::new(db.client().clone());
    let svc = Arc::new(AuthService::new(
        users.clone(),
        users,
        apps,
        config.auth.clone(),
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, api::router(svc))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("sso server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(signal = "SIGINT", "shutting down"),
        _ = terminate => info!(signal = "SIGTERM", "shutting down"),
    }
}
