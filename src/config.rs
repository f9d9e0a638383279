use crate::core::db::{ConnectOptions, ConnectParams, DbConnection};
use crate::core::{Result, SqlCrudError};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables that override the `[database]` section.
pub const ENV_HOST: &str = "DB_HOST";
pub const ENV_USER: &str = "DB_USER";
pub const ENV_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_DATABASE: &str = "DB_DATABASE";

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub connection: ConnectionConfig,
    pub logging: LoggingConfig,
}

/// Where to connect and as whom.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .finish()
    }
}

/// Session settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub foreign_keys: Option<bool>,
    pub busy_timeout_ms: Option<u64>,
}

/// Logging configuration. `RUST_LOG` still wins when set.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl Config {
    /// Overrides `[database]` keys with the `DB_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Overrides `[database]` keys with whatever `lookup` returns for the
    /// `DB_*` variable names. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = &mut self.database;
        for (key, slot) in [
            (ENV_HOST, &mut db.host),
            (ENV_USER, &mut db.user),
            (ENV_PASSWORD, &mut db.password),
            (ENV_DATABASE, &mut db.database),
        ] {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = Some(value);
            }
        }
    }

    /// Builds connection parameters. Missing host, user and password default
    /// to empty strings; a missing database is an error.
    pub fn connect_params(&self) -> Result<ConnectParams> {
        let db = &self.database;
        let database = db.database.as_deref().ok_or_else(|| {
            SqlCrudError::Config(format!(
                "no database configured: set [database].database or {}",
                ENV_DATABASE
            ))
        })?;
        Ok(ConnectParams::new(
            db.host.as_deref().unwrap_or_default(),
            db.user.as_deref().unwrap_or_default(),
            db.password.as_deref().unwrap_or_default(),
            database,
        ))
    }

    pub fn connect_options(&self) -> ConnectOptions {
        let defaults = ConnectOptions::default();
        ConnectOptions {
            foreign_keys: self.connection.foreign_keys.unwrap_or(defaults.foreign_keys),
            busy_timeout: self
                .connection
                .busy_timeout_ms
                .map(Duration::from_millis)
                .or(defaults.busy_timeout),
        }
    }
}

impl DbConnection {
    /// Connects using the `[database]` and `[connection]` sections of `config`.
    pub fn connect_from_config(&mut self, config: &Config) -> Result<()> {
        self.connect_with(config.connect_params()?, config.connect_options())
    }
}

/// Default configuration file location: `<config dir>/sqlcrud/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sqlcrud").join("config.toml"))
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = sqlcrud::config::load_config("config.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| SqlCrudError::Config(e.to_string()))
}
