//! Runtime configuration for the uoffer core.
//!
//! # Responsibility
//! - Describe database location, logging defaults, category deletion policy
//!   and the role-to-word-granularity redaction policy.
//! - Load configuration from JSON with environment overrides.
//!
//! # Invariants
//! - Every field has a default, so `{}` is a valid configuration.
//! - `top` granularities must keep at least one word.

use crate::logging::default_log_level;
use crate::model::role::Role;
use crate::model::word::WordGranularity;
use crate::service::category_service::CategoryDeleteMode;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable pointing at a JSON config file.
pub const CONFIG_PATH_ENV: &str = "UOFFER_CONFIG";
/// Environment variable overriding `db_path`.
pub const DB_PATH_ENV: &str = "UOFFER_DB_PATH";

const DEFAULT_DB_FILE_NAME: &str = "uoffer.sqlite3";
const DEFAULT_USER_TOP_WORDS: u32 = 10;

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// Config text is not valid JSON for `CoreConfig`.
    Parse(serde_json::Error),
    /// Value parsed but violates a config invariant.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Word granularity granted to each role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordProjectionPolicy {
    pub admin: WordGranularity,
    pub user: WordGranularity,
}

impl Default for WordProjectionPolicy {
    fn default() -> Self {
        Self {
            admin: WordGranularity::Full,
            user: WordGranularity::Top {
                limit: DEFAULT_USER_TOP_WORDS,
            },
        }
    }
}

impl WordProjectionPolicy {
    /// Returns the granularity `role` may see.
    pub fn granularity_for(&self, role: Role) -> WordGranularity {
        match role {
            Role::Admin => self.admin,
            Role::User => self.user,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (role, granularity) in [(Role::Admin, self.admin), (Role::User, self.user)] {
            if granularity == (WordGranularity::Top { limit: 0 }) {
                return Err(ConfigError::Invalid(format!(
                    "word_projection.{role} top limit must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

/// Core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Log level (`trace|debug|info|warn|error`).
    pub log_level: String,
    /// Absolute log directory; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// Deletion policy for categories still referenced by posts.
    pub category_delete: CategoryDeleteMode,
    /// Role-based word redaction policy.
    pub word_projection: WordProjectionPolicy,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            category_delete: CategoryDeleteMode::default(),
            word_projection: WordProjectionPolicy::default(),
        }
    }
}

impl CoreConfig {
    /// Parses and validates configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Builds configuration from `UOFFER_CONFIG` (optional file) and
    /// `UOFFER_DB_PATH` (optional override).
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match non_empty_env(CONFIG_PATH_ENV) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(db_path) = non_empty_env(DB_PATH_ENV) {
            config.db_path = PathBuf::from(db_path);
        }
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path must not be empty".to_string()));
        }
        self.word_projection.validate()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, WordProjectionPolicy};
    use crate::model::role::Role;
    use crate::model::word::WordGranularity;
    use crate::service::category_service::CategoryDeleteMode;
    use std::io::Write;

    #[test]
    fn empty_object_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config.category_delete, CategoryDeleteMode::Restrict);
        assert_eq!(config.word_projection, WordProjectionPolicy::default());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn parses_policy_overrides() {
        let config = CoreConfig::from_json_str(
            r#"{
                "db_path": "/var/lib/uoffer/db.sqlite3",
                "category_delete": "cascade",
                "word_projection": { "user": "summary", "admin": { "top": { "limit": 3 } } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.category_delete, CategoryDeleteMode::Cascade);
        assert_eq!(
            config.word_projection.granularity_for(Role::User),
            WordGranularity::Summary
        );
        assert_eq!(
            config.word_projection.granularity_for(Role::Admin),
            WordGranularity::Top { limit: 3 }
        );
    }

    #[test]
    fn rejects_zero_top_limit() {
        let err = CoreConfig::from_json_str(r#"{"word_projection": {"user": {"top": {"limit": 0}}}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("user")));
    }

    #[test]
    fn rejects_unknown_delete_mode() {
        let err = CoreConfig::from_json_str(r#"{"category_delete": "orphan"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"category_delete": "cascade"}}"#).unwrap();

        let config = CoreConfig::load(file.path()).unwrap();
        assert_eq!(config.category_delete, CategoryDeleteMode::Cascade);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CoreConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
