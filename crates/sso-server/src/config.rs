//! Server configuration, loaded from environment variables.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, bail};
use sso_auth::AuthConfig;
use sso_db::DbConfig;

/// Deployment tier. Affects log format and verbosity only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    Local,
    Dev,
    Prod,
}

impl FromStr for Env {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Env::Local),
            "dev" => Ok(Env::Dev),
            "prod" => Ok(Env::Prod),
            other => bail!("unknown environment tier: {other}"),
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Env::Local => "local",
            Env::Dev => "dev",
            Env::Prod => "prod",
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub env: Env,
    /// HTTP listening port.
    pub port: u16,
    pub db: DbConfig,
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load from `SSO_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let db_defaults = DbConfig::default();
        let auth_defaults = AuthConfig::default();

        let env = match lookup("SSO_ENV") {
            Some(v) => v.parse()?,
            None => Env::Local,
        };
        let port = match lookup("SSO_PORT") {
            Some(v) => v.parse().with_context(|| format!("invalid SSO_PORT: {v}"))?,
            None => 44044,
        };
        let token_ttl_secs = match lookup("SSO_TOKEN_TTL_SECS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("invalid SSO_TOKEN_TTL_SECS: {v}"))?,
            None => auth_defaults.token_ttl_secs,
        };

        Ok(Self {
            env,
            port,
            db: DbConfig {
                url: lookup("SSO_DB_URL").unwrap_or(db_defaults.url),
                namespace: lookup("SSO_DB_NAMESPACE").unwrap_or(db_defaults.namespace),
                database: lookup("SSO_DB_NAME").unwrap_or(db_defaults.database),
                username: lookup("SSO_DB_USER").unwrap_or(db_defaults.username),
                password: lookup("SSO_DB_PASSWORD").unwrap_or(db_defaults.password),
            },
            auth: AuthConfig {
                token_ttl_secs,
                pepper: lookup("SSO_PEPPER").filter(|p| !p.is_empty()),
            },
        })
    }
}
