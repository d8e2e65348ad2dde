//! Typed configuration loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Environment overrides go through a caller-supplied lookup function.

use crate::logging::{default_log_level, normalize_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_INSIGHTS_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_INSIGHTS_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_DATABASE_PATH: &str = "perfscope.db";

/// Environment variable replacing `insights.base_url`.
pub const ENV_INSIGHTS_BASE_URL: &str = "AI_SERVICE_URL";
pub const ENV_DATABASE_PATH: &str = "PERFSCOPE_DB";
pub const ENV_LOG_LEVEL: &str = "PERFSCOPE_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub database_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files; file logging is off when unset.
    pub log_dir: Option<PathBuf>,
    pub insights: InsightsConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
            insights: InsightsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InsightsConfig {
    pub base_url: String,
    /// Whole-request timeout for one outbound call.
    pub timeout_ms: u64,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_INSIGHTS_BASE_URL.to_string(),
            timeout_ms: DEFAULT_INSIGHTS_TIMEOUT_MS,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidValue { field, message } => write!(f, "invalid `{field}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl CoreConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = read(ENV_INSIGHTS_BASE_URL) {
            self.insights.base_url = base_url.trim().to_string();
        }
        if let Some(path) = read(ENV_DATABASE_PATH) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        normalize_level(&self.log_level).map_err(|err| ConfigError::InvalidValue {
            field: "log_level",
            message: err.to_string(),
        })?;
        let base_url = self.insights.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "insights.base_url",
                message: format!("expected an http(s) URL, got `{base_url}`"),
            });
        }
        if self.insights.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "insights.timeout_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DEFAULT_INSIGHTS_BASE_URL, ENV_INSIGHTS_BASE_URL};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_toml_str("").expect("empty config");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.insights.base_url, DEFAULT_INSIGHTS_BASE_URL);
        assert_eq!(config.insights.timeout_ms, 5_000);
    }

    #[test]
    fn parses_nested_insights_table() {
        let config = CoreConfig::from_toml_str(
            r#"
            database_path = "/var/lib/perfscope.db"
            log_level = "warn"

            [insights]
            base_url = "https://ai.internal:9000"
            timeout_ms = 750
            "#,
        )
        .expect("valid config");
        assert_eq!(config.database_path, PathBuf::from("/var/lib/perfscope.db"));
        assert_eq!(config.insights.base_url, "https://ai.internal:9000");
        assert_eq!(config.insights.timeout_ms, 750);
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        assert!(matches!(
            CoreConfig::from_toml_str("colour = 1"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            CoreConfig::from_toml_str("[insights]\ntimeout_ms = 0"),
            Err(ConfigError::InvalidValue { field: "insights.timeout_ms", .. })
        ));
        assert!(matches!(
            CoreConfig::from_toml_str("[insights]\nbase_url = \"ftp://x\""),
            Err(ConfigError::InvalidValue { field: "insights.base_url", .. })
        ));
        assert!(matches!(
            CoreConfig::from_toml_str("log_level = \"chatty\""),
            Err(ConfigError::InvalidValue { field: "log_level", .. })
        ));
    }

    #[test]
    fn env_lookup_overrides_base_url() {
        let env = HashMap::from([(ENV_INSIGHTS_BASE_URL, "http://127.0.0.1:8111".to_string())]);
        let config = CoreConfig::default()
            .apply_env_overrides(|key| env.get(key).cloned())
            .expect("override");
        assert_eq!(config.insights.base_url, "http://127.0.0.1:8111");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let config = CoreConfig::default()
            .apply_env_overrides(|_| Some("  ".to_string()))
            .expect("override");
        assert_eq!(config, CoreConfig::default());
    }
}
