//! Runtime configuration values.

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::str::FromStr;

/// Where records (or sessions) are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Memory,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Backend::Postgres),
            "memory" | "mem" => Ok(Backend::Memory),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// PostgreSQL schema holding the tables. Must be a valid identifier.
    pub schema: String,
    pub bind_addr: SocketAddr,
    pub storage: Backend,
    pub sessions: Backend,
    pub body_limit_bytes: usize,
}

impl AppConfig {
    pub const DEFAULT_DATABASE_URL: &'static str = "postgres://localhost/travel";
    pub const DEFAULT_SCHEMA: &'static str = "public";
    pub const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:8000";
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    pub const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;

    pub fn needs_database(&self) -> bool {
        self.storage == Backend::Postgres || self.sessions == Backend::Postgres
    }
}

pub(crate) fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
