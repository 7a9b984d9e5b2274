//! Back-office configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::pool::DbConfig;
use bistro_core::BusinessLimits;

/// Back-office configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BistroConfig {
    /// SQLite database file, or `:memory:`
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// How long a writer waits for the write lock, in milliseconds
    pub busy_timeout_ms: u64,

    /// Caps enforced by the catalog and order workflow
    pub limits: BusinessLimits,
}

impl BistroConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                    | Default     |
    /// |-----------------------------|-------------|
    /// | `BISTRO_DB_PATH`            | `bistro.db` |
    /// | `BISTRO_DB_MAX_CONNECTIONS` | `5`         |
    /// | `BISTRO_DB_BUSY_TIMEOUT_MS` | `5000`      |
    /// | `BISTRO_MAX_TABLES`         | `10`        |
    /// | `BISTRO_MAX_MENU_ITEMS`     | `10`        |
    /// | `BISTRO_MAX_ITEM_QUANTITY`  | `999`       |
    /// | `BISTRO_MAX_ORDER_LINES`    | `100`       |
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Same as [`BistroConfig::load`], reading values through `lookup`.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = BistroConfig {
            database_path: lookup("BISTRO_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("bistro.db")),

            max_connections: parse_or(&lookup, "BISTRO_DB_MAX_CONNECTIONS", 5)?,

            busy_timeout_ms: parse_or(&lookup, "BISTRO_DB_BUSY_TIMEOUT_MS", 5_000)?,

            limits: BusinessLimits {
                max_tables: parse_or(
                    &lookup,
                    "BISTRO_MAX_TABLES",
                    BusinessLimits::DEFAULT_MAX_TABLES,
                )?,
                max_menu_items: parse_or(
                    &lookup,
                    "BISTRO_MAX_MENU_ITEMS",
                    BusinessLimits::DEFAULT_MAX_MENU_ITEMS,
                )?,
                max_item_quantity: parse_or(
                    &lookup,
                    "BISTRO_MAX_ITEM_QUANTITY",
                    BusinessLimits::DEFAULT_MAX_ITEM_QUANTITY,
                )?,
                max_order_lines: parse_or(
                    &lookup,
                    "BISTRO_MAX_ORDER_LINES",
                    BusinessLimits::DEFAULT_MAX_ORDER_LINES,
                )?,
            },
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("BISTRO_DB_MAX_CONNECTIONS".to_string()));
        }
        if config.limits.max_item_quantity < 1 {
            return Err(ConfigError::InvalidValue("BISTRO_MAX_ITEM_QUANTITY".to_string()));
        }

        Ok(config)
    }

    /// Pool settings for [`crate::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        let config = if self.database_path.as_os_str() == crate::pool::IN_MEMORY_PATH {
            DbConfig::in_memory()
        } else {
            DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
        };
        config.busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
