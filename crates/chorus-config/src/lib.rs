//! # chorus-config
//!
//! Layered configuration loading for chorus using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`CHORUS_*` prefix, `__` as separator)
//! 2. Project-level `.chorus/config.toml`
//! 3. User-level `~/.config/chorus/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `CHORUS_DATABASE__PATH` -> `database.path`,
//! `CHORUS_HISTORY__DEFAULT_FORMAT` -> `history.default_format`, etc.
//!
//! ```no_run
//! use chorus_config::ChorusConfig;
//!
//! let config = ChorusConfig::load_with_dotenv().expect("config");
//! println!("database: {}", config.database.path);
//! ```

mod database;
mod error;
mod history;
mod logging;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use history::{ExportConfig, HistoryConfig, HistoryFormat};
pub use logging::LogConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChorusConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl ChorusConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env`
    /// support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load with an extra TOML file layered just below the environment, as
    /// used by the CLI's `--config` flag.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is invalid.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let figment = Self::file_layers()
            .merge(Toml::file(path))
            .merge(Env::prefixed("CHORUS_").split("__"));
        Self::from_figment(&figment)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the full provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        Self::file_layers().merge(Env::prefixed("CHORUS_").split("__"))
    }

    /// Extract and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` on extraction failure and
    /// `ConfigError::InvalidValue` for an empty database path.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    fn file_layers() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".chorus/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chorus").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = ChorusConfig::default();
        assert_eq!(config.database.path, "chorus.db");
        assert_eq!(config.history.default_format, HistoryFormat::Json);
        assert_eq!(config.export.output_dir, ".");
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn empty_database_path_is_invalid() {
        let mut config = ChorusConfig::default();
        config.database.path = "   ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
