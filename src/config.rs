//! Runtime configuration read from the environment (and `.env` via dotenvy)

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable for the database connection string
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// Environment variable for the listen address
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";

/// Environment variable pointing at a JSON permission table
pub const ENV_PERMISSIONS_FILE: &str = "PERMISSIONS_FILE";

/// Environment variable to skip migrations on start-up
pub const ENV_RUN_MIGRATIONS: &str = "RUN_MIGRATIONS";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub permissions_file: Option<PathBuf>,
    pub run_migrations: bool,
}

impl AppConfig {
    /// Read configuration from the process environment
    ///
    /// * `DATABASE_URL` - required
    /// * `BIND_ADDR` - default `0.0.0.0:3000`
    /// * `PERMISSIONS_FILE` - optional, compiled-in table when unset
    /// * `RUN_MIGRATIONS` - default `true`
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(ENV_DATABASE_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| format!("{} must be set", ENV_DATABASE_URL))?;

        let bind_raw = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw
            .parse()
            .map_err(|e| format!("Invalid {} '{}': {}", ENV_BIND_ADDR, bind_raw, e))?;

        let permissions_file = lookup(ENV_PERMISSIONS_FILE)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let run_migrations = lookup(ENV_RUN_MIGRATIONS)
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        Ok(Self {
            database_url,
            bind_addr,
            permissions_file,
            run_migrations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "postgres://localhost/consolidation",
        )]))
        .unwrap();

        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:3000");
        assert!(config.permissions_file.is_none());
        assert!(config.run_migrations);
    }

    #[test]
    fn test_missing_database_url() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.contains("DATABASE_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/app"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("PERMISSIONS_FILE", "/etc/consolidation/permissions.json"),
            ("RUN_MIGRATIONS", "FALSE"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(
            config.permissions_file,
            Some(PathBuf::from("/etc/consolidation/permissions.json"))
        );
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_invalid_bind_addr() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/app"),
            ("BIND_ADDR", "not-an-address"),
        ]))
        .unwrap_err();
        assert!(err.contains("BIND_ADDR"));
    }
}
