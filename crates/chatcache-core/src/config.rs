//! Layered configuration: defaults, TOML file, environment overrides
//!
//! File location defaults to `<config_dir>/chatcache/config.toml`.

use crate::cache::CacheConfig;
use crate::error::{CoreError, Result};
use crate::store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Env var overriding `cache.enabled`
pub const ENV_CACHE_ENABLED: &str = "CHATCACHE_CACHE_ENABLED";

/// Env var overriding `log.level`
pub const ENV_LOG_LEVEL: &str = "CHATCACHE_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatcacheConfig {
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub log: LogConfig,
}

impl ChatcacheConfig {
    /// Default config file path, if a config directory exists on this platform
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chatcache").join("config.toml"))
    }

    /// Parse a TOML file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            CoreError::ConfigParse { message, .. } => CoreError::ConfigParse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CoreError::ConfigParse {
            path: PathBuf::new(),
            message: e.to_string(),
        })
    }

    /// Resolve the effective configuration
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present. Environment overrides are applied last, then validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!(path = %path.display(), "Loading default config file");
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in `load`)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup(ENV_CACHE_ENABLED) {
            self.cache.enabled = parse_bool(&raw).ok_or_else(|| CoreError::InvalidConfig {
                message: format!("{} must be a boolean, got '{}'", ENV_CACHE_ENABLED, raw),
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.store.validate()?;
        if self.log.level.trim().is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "log.level must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = ChatcacheConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.cache.enabled);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ChatcacheConfig::from_toml_str(
            r#"
            [cache]
            enabled = false

            [store]
            chat_id_space = 10
            "#,
        )
        .unwrap();

        assert!(!config.cache.enabled);
        assert!(config.cache.invalidate_user_chats_on_create);
        assert_eq!(config.store.chat_id_space, 10);
        assert_eq!(config.store.message_id_space, u64::MAX);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[log]\nlevel = \"debug\"\n").unwrap();

        let config = ChatcacheConfig::from_file(&path).unwrap();
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = ChatcacheConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, CoreError::ConfigRead { .. }));
    }

    #[test]
    fn test_parse_error_carries_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[cache\nenabled = ").unwrap();

        match ChatcacheConfig::from_file(&path).unwrap_err() {
            CoreError::ConfigParse { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [(ENV_CACHE_ENABLED, "off"), (ENV_LOG_LEVEL, "trace")].into();
        let mut config = ChatcacheConfig::default();

        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert!(!config.cache.enabled);
        assert_eq!(config.log.level, "trace");
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let mut config = ChatcacheConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_CACHE_ENABLED).then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_zero_id_space_is_invalid() {
        let config = ChatcacheConfig::from_toml_str("[store]\nmessage_id_space = 0\n").unwrap();
        assert!(config.validate().is_err());
    }
}
