//! Store configuration from the environment.
//!
//! Resolution order:
//! 1. `DATABASE_URL` (must be `sqlite:`-schemed in this build);
//! 2. `MOVIES_DB_PATH` - path of the embedded store file;
//! 3. discrete `MOVIES_DB_*` connection parameters (driver, host, port,
//!    name, user, password, sslmode) - validated, and rejected when they
//!    name a driver this build does not ship;
//! 4. default: `~/.movies-mcp/movies.sqlite`.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported database driver \"{0}\": this build ships the embedded sqlite store")]
    UnsupportedDriver(String),

    #[error("Invalid DATABASE_URL \"{0}\": expected a sqlite: URL")]
    InvalidUrl(String),

    #[error("Could not determine home directory for the default store path")]
    NoHomeDir,
}

/// Resolved store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the embedded store file. `:memory:` is accepted for tests.
    pub db_path: PathBuf,
    /// Connection pool bound.
    pub max_connections: u32,
}

impl StoreConfig {
    /// Build a config for an explicit store path.
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: path.into(),
            max_connections: 5,
        }
    }

    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            let path = url
                .strip_prefix("sqlite://")
                .or_else(|| url.strip_prefix("sqlite:"))
                .ok_or_else(|| match url.split(':').next() {
                    Some(scheme) if !scheme.is_empty() && scheme != url => {
                        ConfigError::UnsupportedDriver(scheme.to_string())
                    }
                    _ => ConfigError::InvalidUrl(url.clone()),
                })?;
            return Ok(Self::for_path(path));
        }

        if let Ok(path) = std::env::var("MOVIES_DB_PATH") {
            return Ok(Self::for_path(path));
        }

        if let Ok(driver) = std::env::var("MOVIES_DB_DRIVER") {
            if !driver.eq_ignore_ascii_case("sqlite") {
                return Err(ConfigError::UnsupportedDriver(driver));
            }
            if let Ok(name) = std::env::var("MOVIES_DB_NAME") {
                return Ok(Self::for_path(name));
            }
        }

        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::for_path(home.join(".movies-mcp").join("movies.sqlite")))
    }
}
