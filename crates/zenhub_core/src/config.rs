//! Hub runtime configuration.
//!
//! # Responsibility
//! - Collect startup settings for logging, catalog generation and theme.
//! - Resolve settings from `ZENHUB_*` environment variables.
//!
//! # Invariants
//! - Unset variables fall back to defaults; set-but-invalid values are errors.
//! - `log_dir`, when set, is absolute.
//! - `log_level` is stored normalized (`trace|debug|info|warn|error`).

use crate::logging::{default_log_level, normalize_level};
use crate::shell::prefs::Theme;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_LOG_LEVEL: &str = "ZENHUB_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ZENHUB_LOG_DIR";
pub const ENV_CATALOG_SEED: &str = "ZENHUB_CATALOG_SEED";
pub const ENV_THEME: &str = "ZENHUB_THEME";

/// Startup settings for one hub session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    pub log_level: String,
    /// File logging is skipped when unset.
    pub log_dir: Option<PathBuf>,
    /// Seeds placeholder category draws; random per process when unset.
    pub catalog_seed: Option<u64>,
    pub theme: Theme,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            catalog_seed: None,
            theme: Theme::default(),
        }
    }
}

impl HubConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, one call per variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let read = |key: &'static str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level)
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_LOG_LEVEL,
                    value: level.clone(),
                    expected: "trace|debug|info|warn|error",
                })?
                .to_string();
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            if !Path::new(&dir).is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_LOG_DIR,
                    value: dir,
                    expected: "an absolute path",
                });
            }
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(seed) = read(ENV_CATALOG_SEED) {
            config.catalog_seed =
                Some(seed.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_CATALOG_SEED,
                    value: seed.clone(),
                    expected: "an unsigned 64-bit integer",
                })?);
        }
        if let Some(theme) = read(ENV_THEME) {
            config.theme = Theme::parse(&theme).ok_or(ConfigError::InvalidValue {
                key: ENV_THEME,
                value: theme.clone(),
                expected: "dark|light",
            })?;
        }
        Ok(config)
    }
}

/// Configuration resolution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "{key} must be {expected}, got `{value}`"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, HubConfig, ENV_CATALOG_SEED, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use crate::shell::prefs::Theme;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = HubConfig::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(config, HubConfig::default());
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.catalog_seed, None);
    }

    #[test]
    fn reads_all_variables() {
        let config = HubConfig::from_lookup(lookup(&[
            ("ZENHUB_LOG_LEVEL", " Warning "),
            ("ZENHUB_LOG_DIR", "/tmp/zenhub-logs"),
            ("ZENHUB_CATALOG_SEED", " 1234 "),
            ("ZENHUB_THEME", "Light"),
        ]))
        .expect("valid config");
        assert_eq!(config.log_level, "warn");
        assert_eq!(
            config.log_dir.as_deref(),
            Some(std::path::Path::new("/tmp/zenhub-logs"))
        );
        assert_eq!(config.catalog_seed, Some(1234));
        assert_eq!(config.theme, Theme::Light);
    }

    #[test]
    fn rejects_relative_log_dir_and_bad_seed() {
        let err = HubConfig::from_lookup(lookup(&[("ZENHUB_LOG_DIR", "logs")]))
            .expect_err("relative dir must fail");
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_LOG_DIR));

        let err = HubConfig::from_lookup(lookup(&[("ZENHUB_CATALOG_SEED", "-3")]))
            .expect_err("negative seed must fail");
        assert!(err.to_string().contains(ENV_CATALOG_SEED));

        let err = HubConfig::from_lookup(lookup(&[("ZENHUB_LOG_LEVEL", "verbose")]))
            .expect_err("unknown level must fail");
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_LOG_LEVEL));
        assert!(err.to_string().contains("trace|debug|info|warn|error"));
    }
}
