//! Load `AppConfig` from the environment (after `.env`, when present).

use super::types::{parse, AppConfig, Backend};
use crate::error::ConfigError;

impl AppConfig {
    /// Read `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage: Backend = match get("STORAGE_BACKEND") {
            Some(v) => parse_backend("STORAGE_BACKEND", &v)?,
            None => Backend::Postgres,
        };
        let sessions = match get("SESSION_BACKEND") {
            Some(v) => parse_backend("SESSION_BACKEND", &v)?,
            None => storage,
        };
        let schema = get("TRAVEL_SCHEMA").unwrap_or_else(|| AppConfig::DEFAULT_SCHEMA.into());
        if !is_identifier(&schema) {
            return Err(ConfigError::Invalid {
                key: "TRAVEL_SCHEMA",
                value: schema,
            });
        }

        Ok(AppConfig {
            database_url: get("DATABASE_URL").unwrap_or_else(|| AppConfig::DEFAULT_DATABASE_URL.into()),
            max_connections: get("DATABASE_MAX_CONNECTIONS")
                .map(|v| parse("DATABASE_MAX_CONNECTIONS", &v))
                .transpose()?
                .unwrap_or(AppConfig::DEFAULT_MAX_CONNECTIONS),
            schema,
            bind_addr: parse(
                "BIND_ADDR",
                &get("BIND_ADDR").unwrap_or_else(|| AppConfig::DEFAULT_BIND_ADDR.into()),
            )?,
            storage,
            sessions,
            body_limit_bytes: get("BODY_LIMIT_BYTES")
                .map(|v| parse("BODY_LIMIT_BYTES", &v))
                .transpose()?
                .unwrap_or(AppConfig::DEFAULT_BODY_LIMIT_BYTES),
        })
    }
}

fn parse_backend(key: &'static str, value: &str) -> Result<Backend, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

/// Plain lowercase PostgreSQL identifier.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_lowercase())
        && chars.all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.database_url, AppConfig::DEFAULT_DATABASE_URL);
        assert_eq!(cfg.schema, "public");
        assert_eq!(cfg.max_connections, 5);
        assert_eq!(cfg.bind_addr.port(), 8000);
        assert_eq!(cfg.storage, Backend::Postgres);
        assert_eq!(cfg.sessions, Backend::Postgres);
        assert!(cfg.needs_database());
    }

    #[test]
    fn session_backend_follows_storage_unless_set() {
        let cfg = load(&[("STORAGE_BACKEND", "memory")]).unwrap();
        assert_eq!(cfg.sessions, Backend::Memory);
        assert!(!cfg.needs_database());

        let cfg = load(&[("STORAGE_BACKEND", "memory"), ("SESSION_BACKEND", "postgres")]).unwrap();
        assert_eq!(cfg.sessions, Backend::Postgres);
        assert!(cfg.needs_database());
    }

    #[test]
    fn invalid_values_name_their_key() {
        let err = load(&[("DATABASE_MAX_CONNECTIONS", "many")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DATABASE_MAX_CONNECTIONS", .. }));

        let err = load(&[("STORAGE_BACKEND", "redis")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STORAGE_BACKEND", .. }));

        let err = load(&[("TRAVEL_SCHEMA", "bad-name;")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TRAVEL_SCHEMA", .. }));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = load(&[("BIND_ADDR", "  ")]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8000");
    }
}
