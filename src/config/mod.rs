//! Configuration: dashboard item files, application settings and the
//! persisted window geometry.
//!
//! Everything lives under one configuration directory, `~/.tiny-dash` unless
//! `--config-dir` says otherwise:
//!
//! ```text
//! ~/.tiny-dash/
//! ├── config.toml      dashboard items, read when no files are given
//! ├── settings.toml    optional application settings
//! ├── geometry         last window size, "WxH"
//! └── tinydash.log     log output
//! ```

mod geometry;
mod items;

pub use geometry::Geometry;
pub use items::{builtin_defaults, DashboardItem, ItemLoader};

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

/// Name of the default dashboard file inside the configuration directory.
pub const DEFAULT_ITEMS_FILE: &str = "config.toml";
/// Name of the optional settings file inside the configuration directory.
pub const SETTINGS_FILE: &str = "settings.toml";
/// Name of the log file inside the configuration directory.
pub const LOG_FILE: &str = "tinydash.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("{0} is an unknown sensor type")]
    UnknownSensor(String),

    #[error("item has no sensor type")]
    MissingSensor,

    #[error("invalid sensor configuration: {0}")]
    InvalidSensor(String),

    #[error("invalid geometry {0:?}, expected WxH")]
    Geometry(String),

    #[error(transparent)]
    Settings(#[from] config::ConfigError),
}

/// Application settings, independent of the dashboard items.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Redraw tick period.
    pub refresh_ms: u64,
    /// Layout width when the window size is unknown.
    pub fallback_width: u32,
    /// Pixels per terminal column when the terminal does not say.
    pub cell_width: u16,
    pub cell_height: u16,
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_ms: 100,
            fallback_width: 600,
            cell_width: 8,
            cell_height: 16,
            http_timeout_secs: 10,
        }
    }
}

impl Settings {
    /// Load built-in defaults, then `settings.toml` from `config_dir` if it
    /// exists, then `TINYDASH_*` environment variables.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(config_dir, Environment::with_prefix("TINYDASH"))
    }

    fn load_with_env(config_dir: &Path, env: Environment) -> Result<Self, ConfigError> {
        let d = Settings::default();
        let settings = Config::builder()
            .set_default("refresh_ms", d.refresh_ms as i64)?
            .set_default("fallback_width", i64::from(d.fallback_width))?
            .set_default("cell_width", i64::from(d.cell_width))?
            .set_default("cell_height", i64::from(d.cell_height))?
            .set_default("http_timeout_secs", d.http_timeout_secs as i64)?
            .add_source(
                File::from(config_dir.join(SETTINGS_FILE))
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(env.try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// `~/.tiny-dash`, or `.tiny-dash` relative to the working directory when
/// there is no home directory.
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".tiny-dash")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env() -> Environment {
        Environment::with_prefix("TINYDASH").source(Some(HashMap::new()))
    }

    #[test]
    fn test_settings_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_with_env(dir.path(), no_env()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.refresh_period(), Duration::from_millis(100));
    }

    #[test]
    fn test_settings_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            "refresh_ms = 250\ncell_width = 10\n",
        )
        .unwrap();

        let settings = Settings::load_with_env(dir.path(), no_env()).unwrap();
        assert_eq!(settings.refresh_ms, 250);
        assert_eq!(settings.cell_width, 10);
        assert_eq!(settings.fallback_width, 600);
    }

    #[test]
    fn test_settings_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "http_timeout_secs = 3\n").unwrap();

        let env = Environment::with_prefix("TINYDASH").source(Some(HashMap::from([(
            "TINYDASH_HTTP_TIMEOUT_SECS".to_string(),
            "30".to_string(),
        )])));
        let settings = Settings::load_with_env(dir.path(), env).unwrap();
        assert_eq!(settings.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_default_config_dir_name() {
        assert!(default_config_dir().ends_with(".tiny-dash"));
    }
}
