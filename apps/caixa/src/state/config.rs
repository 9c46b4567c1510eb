//! # Configuration State
//!
//! Application configuration loaded at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line (highest priority)                                    │
//! │     caixa --demo ...                                                   │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     VIDRACARIA_DB_PATH=/srv/vidracaria/caixa.db                        │
//! │     VIDRACARIA_DEMO=1                                                  │
//! │     VIDRACARIA_STORE_TIMEOUT_SECS=5                                    │
//! │     VIDRACARIA_BUSINESS_NAME="Vidraçaria Central"                      │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config <path>, or the platform config dir:                       │
//! │     ~/.config/vidracaria/caixa.toml (Linux)                            │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     no database path → demo mode, 10s store timeout                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # caixa.toml
//! [business]
//! name = "Vidraçaria Central"
//!
//! [database]
//! path = "/srv/vidracaria/caixa.db"
//! max_connections = 5
//! connect_timeout_secs = 30
//!
//! [store]
//! timeout_secs = 10
//! demo = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use vidracaria_core::{Money, CURRENCY_SYMBOL};

use crate::error::{CaixaError, CaixaResult};

/// Business shown in report headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessSettings {
    #[serde(default = "default_business_name")]
    pub name: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_business_name() -> String {
    "Vidraçaria".to_string()
}

fn default_currency_symbol() -> String {
    CURRENCY_SYMBOL.to_string()
}

impl Default for BusinessSettings {
    fn default() -> Self {
        BusinessSettings {
            name: default_business_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

/// SQLite settings. Without a path the app runs on the demo tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long to wait for the database file to open.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl DatabaseSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Upper bound on every store call made by a command.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Force the demo tables even when a database path is set.
    #[serde(default)]
    pub demo: bool,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            timeout_secs: default_timeout_secs(),
            demo: false,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigState {
    #[serde(default)]
    pub business: BusinessSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub store: StoreSettings,
}

impl ConfigState {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (caixa.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CaixaResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else if explicit {
                return Err(CaixaError::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> CaixaResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CaixaResult<()> {
        if self.business.name.trim().is_empty() {
            return Err(CaixaError::config("business.name must not be empty"));
        }
        if self.store.timeout_secs == 0 {
            return Err(CaixaError::config(
                "store.timeout_secs must be greater than 0",
            ));
        }
        if self.database.max_connections == 0 {
            return Err(CaixaError::config(
                "database.max_connections must be greater than 0",
            ));
        }
        if self.database.connect_timeout_secs == 0 {
            return Err(CaixaError::config(
                "database.connect_timeout_secs must be greater than 0",
            ));
        }
        if let Some(path) = &self.database.path {
            if path.as_os_str().is_empty() {
                return Err(CaixaError::config("database.path must not be empty"));
            }
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `VIDRACARIA_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("VIDRACARIA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = if path.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }

        if let Some(demo) = lookup("VIDRACARIA_DEMO") {
            match demo.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.store.demo = true,
                "0" | "false" | "no" | "off" => self.store.demo = false,
                _ => warn!(value = %demo, "Unknown VIDRACARIA_DEMO value"),
            }
        }

        if let Some(timeout) = lookup("VIDRACARIA_STORE_TIMEOUT_SECS") {
            match timeout.trim().parse::<u64>() {
                Ok(secs) => self.store.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Invalid VIDRACARIA_STORE_TIMEOUT_SECS"),
            }
        }

        if let Some(name) = lookup("VIDRACARIA_BUSINESS_NAME") {
            self.business.name = name;
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("br", "vidracaria", "caixa")
            .map(|dirs| dirs.config_dir().join("caixa.toml"))
    }

    /// True when no database is configured or demo mode is forced.
    pub fn is_demo(&self) -> bool {
        self.store.demo || self.database.path.is_none()
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store.timeout_secs)
    }

    /// Formats an amount with the configured currency symbol.
    pub fn format_currency(&self, amount: Money) -> String {
        amount
            .to_string()
            .replacen(CURRENCY_SYMBOL, &self.business.currency_symbol, 1)
    }
}
