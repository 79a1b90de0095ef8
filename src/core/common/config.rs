// src/core/common/config.rs

use crate::core::common::error::DbError;
use crate::core::transaction::IsolationLevel;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Tunable knobs for the storage and transaction engine.
///
/// Supports loading from a TOML file and otherwise falls back to sensible
/// defaults: autocommit on, `READ_COMMITTED` isolation.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Whether a DML statement issued with no `ACTIVE` transaction is
    /// implicitly wrapped in a begin/commit pair.
    #[serde(default = "default_autocommit_enabled")]
    pub autocommit_enabled: bool,

    /// Isolation level new transactions start with unless overridden by the
    /// caller's `BEGIN` statement.
    #[serde(default = "default_isolation_level")]
    pub default_isolation_level: IsolationLevel,

    /// Maximum length, in bytes, of table/column/constraint/index names.
    #[serde(default = "default_max_identifier_len")]
    pub max_identifier_len: usize,

    /// Maximum length, in bytes, of a column's textual default literal.
    #[serde(default = "default_max_literal_len")]
    pub max_literal_len: usize,
}

fn default_autocommit_enabled() -> bool {
    true
}

fn default_isolation_level() -> IsolationLevel {
    IsolationLevel::ReadCommitted
}

fn default_max_identifier_len() -> usize {
    63
}

fn default_max_literal_len() -> usize {
    255
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autocommit_enabled: default_autocommit_enabled(),
            default_isolation_level: default_isolation_level(),
            max_identifier_len: default_max_identifier_len(),
            max_literal_len: default_max_literal_len(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Internal` if the file exists but cannot be parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, DbError> {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(|e| {
                DbError::Internal(format!(
                    "failed to parse config file '{}': {e}",
                    path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(DbError::Internal(format!("failed to read config file: {e}"))),
        }
    }

    /// Loads from `optional_path` if given, otherwise returns defaults.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Internal` under the same conditions as
    /// [`EngineConfig::load_from_file`].
    pub fn load_or_default(optional_path: Option<&Path>) -> Result<Self, DbError> {
        match optional_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_matches_spec_defaults() {
        let config = EngineConfig::default();
        assert!(config.autocommit_enabled);
        assert_eq!(config.default_isolation_level, IsolationLevel::ReadCommitted);
        assert_eq!(config.max_identifier_len, 63);
        assert_eq!(config.max_literal_len, 255);
    }

    #[test]
    fn load_from_missing_file_returns_defaults() {
        let config = EngineConfig::load_from_file(Path::new("does_not_exist.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn load_from_file_overrides_fields() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            autocommit_enabled = false
            default_isolation_level = "serializable"
            max_identifier_len = 32
            max_literal_len = 128
            "#
        )
        .unwrap();

        let config = EngineConfig::load_from_file(file.path()).unwrap();
        assert!(!config.autocommit_enabled);
        assert_eq!(config.default_isolation_level, IsolationLevel::Serializable);
        assert_eq!(config.max_identifier_len, 32);
        assert_eq!(config.max_literal_len, 128);
    }

    #[test]
    fn load_from_file_fills_missing_fields_with_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "autocommit_enabled = false").unwrap();

        let config = EngineConfig::load_from_file(file.path()).unwrap();
        assert!(!config.autocommit_enabled);
        assert_eq!(config.default_isolation_level, IsolationLevel::ReadCommitted);
    }

    #[test]
    fn load_from_malformed_file_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml : :").unwrap();
        assert!(EngineConfig::load_from_file(file.path()).is_err());
    }
}
