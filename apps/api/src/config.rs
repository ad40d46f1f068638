use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Key-value file read when `ENV_FILE` is not set.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Connection settings for the applications database.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Application configuration, built once at startup and handed to whoever needs it.
/// Fails if any of the database keys is missing or empty.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub port: u16,
    pub run_migrations: bool,
    pub rust_log: String,
}

impl Config {
    /// Resolves the configuration from the process environment and the `.env` file.
    pub fn load() -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok(), Path::new(DEFAULT_ENV_FILE))
    }

    /// Reads the key-value file named by `ENV_FILE` in `env`, falling back to
    /// `default_file`, then resolves every key against `env` first and the file second.
    /// An explicit `ENV_FILE` must exist; a missing default file is skipped.
    pub fn resolve<E>(env: E, default_file: &Path) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let file_vars = match env("ENV_FILE") {
            Some(path) => {
                let path = Path::new(&path);
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                read_env_file(path)?
            }
            None if default_file.exists() => read_env_file(default_file)?,
            None => HashMap::new(),
        };

        Self::from_vars(|key| env(key).or_else(|| file_vars.get(key).cloned()))
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = DatabaseConfig {
            host: require(&lookup, "DB_HOST")?,
            name: require(&lookup, "DB_NAME")?,
            user: require(&lookup, "DB_USER")?,
            password: require(&lookup, "DB_PASSWORD")?,
            port: parse_or(&lookup, "DB_PORT", 5432)?,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
        };

        Ok(Config {
            database,
            port: parse_or(&lookup, "PORT", 8080)?,
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", false)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Reads a `.env`-style file into a map without touching the process environment.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open config file {}", path.display()))?;

    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) =
            item.with_context(|| format!("Malformed line in config file {}", path.display()))?;
        vars.insert(key, value);
    }
    Ok(vars)
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("Required configuration key '{key}' is not set"),
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("'{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
