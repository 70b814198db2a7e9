// src/config.rs
//
// Application configuration (kvk.toml)
//
// Every section is optional; missing values fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Environment variable overriding the database file location
pub const DATABASE_PATH_ENV: &str = "KVK_DATABASE_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file. `None` means `{DATA_DIR}/kvk-reporting/kvk.db`.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 15,
            busy_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise defaults, then apply the
    /// `KVK_DATABASE_PATH` override.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };

        if let Ok(db_path) = std::env::var(DATABASE_PATH_ENV) {
            if !db_path.trim().is_empty() {
                config.database.path = Some(PathBuf::from(db_path));
            }
        }

        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.database.max_connections == 0 {
            return Err(AppError::Other(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.pagination.default_limit == 0 {
            return Err(AppError::Other(
                "pagination.default_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
