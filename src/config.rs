use std::env;
use std::time::Duration;

use crate::db::RetrieverConfig;

pub const DEFAULT_ACTIVE_STATUS: &str = "1";
pub const DEFAULT_MAX_DEPTH: usize = 256;
/// Upper bound for `ORG_TREE_MAX_DEPTH`; JSON encoding of the tree still recurses per level.
pub const MAX_DEPTH_CEILING: usize = 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub active_status: String,
    pub max_depth: usize,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Only `DATABASE_URL` is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, env::VarError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(env::VarError::NotPresent)?;

        Ok(Config {
            database_url,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: lookup("SERVER_PORT")
                .or_else(|| lookup("PORT"))
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            active_status: lookup("ORG_ACTIVE_STATUS")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_ACTIVE_STATUS.to_string()),
            max_depth: lookup("ORG_TREE_MAX_DEPTH")
                .and_then(|v| v.parse().ok())
                .filter(|d| *d > 0)
                .map(|d: usize| d.min(MAX_DEPTH_CEILING))
                .unwrap_or(DEFAULT_MAX_DEPTH),
            db_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            db_acquire_timeout: Duration::from_secs(
                lookup("DATABASE_ACQUIRE_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn retriever_config(&self) -> RetrieverConfig {
        RetrieverConfig {
            active_status: self.active_status.clone(),
        }
    }
}
