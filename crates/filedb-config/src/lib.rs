//! Configuration management for filedb.
//!
//! Parses `filedb.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Example
//!
//! ```toml
//! [store]
//! root = "${FILEDB_ROOT:-data}"
//! indent = "  "
//!
//! [log]
//! level = "debug"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `store.root`
//! - `log.level`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override store root directory.
    pub root: Option<PathBuf>,
    /// Override log level.
    pub log_level: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "filedb.toml";

/// Default store root, relative to the config directory.
const DEFAULT_ROOT: &str = "data";

/// Default JSON indentation.
const DEFAULT_INDENT: &str = "\t";

/// Accepted values for `log.level`.
const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration (paths are relative strings from TOML).
    store: StoreConfigRaw,
    /// Logging configuration.
    pub log: LogConfig,

    /// Resolved store configuration (set after loading).
    #[serde(skip)]
    pub store_resolved: StoreConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw store configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StoreConfigRaw {
    root: Option<String>,
    indent: Option<String>,
}

/// Resolved store configuration with absolute paths.
#[derive(Debug)]
pub struct StoreConfig {
    /// Root directory holding the collections.
    pub root: PathBuf,
    /// Indentation used when pretty-printing records.
    pub indent: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            indent: DEFAULT_INDENT.to_owned(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Maximum level emitted (`off`, `error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`store.root`").
        field: String,
        /// Error message (e.g., "${`FILEDB_ROOT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `filedb.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.root {
            self.store_resolved.root.clone_from(root);
        }
        if let Some(level) = &settings.log_level {
            self.log.level.clone_from(level);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            store: StoreConfigRaw::default(),
            log: LogConfig::default(),
            store_resolved: StoreConfig {
                root: base.join(DEFAULT_ROOT),
                indent: DEFAULT_INDENT.to_owned(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_store()?;
        self.validate_log()?;
        Ok(())
    }

    /// Validate store configuration.
    fn validate_store(&self) -> Result<(), ConfigError> {
        if let Some(root) = &self.store.root {
            require_non_empty(root, "store.root")?;
        }
        require_non_empty(
            &self.store_resolved.root.to_string_lossy(),
            "store.root",
        )?;

        // Anything else would not be valid JSON whitespace
        if !self
            .store_resolved
            .indent
            .chars()
            .all(|c| c == ' ' || c == '\t')
        {
            return Err(ConfigError::Validation(
                "store.indent may only contain spaces and tabs".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate logging configuration.
    fn validate_log(&self) -> Result<(), ConfigError> {
        let level = self.log.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "log.level must be one of {}, got {:?}",
                LOG_LEVELS.join(", "),
                self.log.level
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref root) = self.store.root {
            self.store.root = Some(expand::expand_env(root, "store.root")?);
        }
        self.log.level = expand::expand_env(&self.log.level, "log.level")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.store_resolved = StoreConfig {
            root: config_dir.join(self.store.root.as_deref().unwrap_or(DEFAULT_ROOT)),
            indent: self
                .store
                .indent
                .clone()
                .unwrap_or_else(|| DEFAULT_INDENT.to_owned()),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.store_resolved.root, PathBuf::from("/test/data"));
        assert_eq!(config.store_resolved.indent, "\t");
        assert_eq!(config.log.level, "info");
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = "";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.log.level, "info");
        assert!(config.store.root.is_none());
    }

    #[test]
    fn test_parse_store_config() {
        let toml = r#"
[store]
root = "records"
indent = "    "
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.store_resolved.root, PathBuf::from("/project/records"));
        assert_eq!(config.store_resolved.indent, "    ");
    }

    #[test]
    fn test_absolute_root_is_kept() {
        let toml = r#"
[store]
root = "/var/lib/filedb"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.store_resolved.root,
            PathBuf::from("/var/lib/filedb")
        );
    }

    #[test]
    fn test_parse_log_config() {
        let toml = r#"
[log]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_unknown_field_type_is_parse_error() {
        let toml = r#"
[store]
root = 42
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.log.level = "verbose".to_owned();

        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        assert!(err.to_string().contains("log.level"));
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.log.level = "DEBUG".to_owned();

        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_indent_rejected() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.store_resolved.indent = "--".to_owned();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("store.indent"));
    }

    #[test]
    fn test_empty_root_rejected() {
        let toml = r#"
[store]
root = ""
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("store.root cannot be empty"));
    }

    #[test]
    fn test_apply_cli_settings_root() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            root: Some(PathBuf::from("/custom/db")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.store_resolved.root, PathBuf::from("/custom/db"));
        assert_eq!(config.log.level, "info"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_log_level() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            log_level: Some("trace".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.log.level, "trace");
        assert_eq!(config.store_resolved.root, PathBuf::from("/test/data")); // Unchanged
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("filedb.toml");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(ref p) if p == &path));
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config_dir() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("filedb.toml");
        std::fs::write(
            &path,
            r#"
[store]
root = "${FILEDB_TEST_SURELY_UNSET:-records}"

[log]
level = "warn"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.store_resolved.root, tmp.path().join("records"));
        assert_eq!(config.store_resolved.indent, "\t");
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_applies_cli_settings_last() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("filedb.toml");
        std::fs::write(&path, "[store]\nroot = \"records\"\n").unwrap();
        let overrides = CliSettings {
            root: Some(PathBuf::from("/override")),
            log_level: Some("debug".to_owned()),
        };

        let config = Config::load(Some(&path), Some(&overrides)).unwrap();

        assert_eq!(config.store_resolved.root, PathBuf::from("/override"));
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_load_rejects_invalid_cli_log_level() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("filedb.toml");
        std::fs::write(&path, "").unwrap();
        let overrides = CliSettings {
            log_level: Some("loud".to_owned()),
            ..Default::default()
        };

        let err = Config::load(Some(&path), Some(&overrides)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_unset_env_var_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("filedb.toml");
        std::fs::write(&path, "[store]\nroot = \"${FILEDB_TEST_SURELY_UNSET}\"\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "store.root"));
    }

    #[test]
    fn test_load_malformed_toml_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("filedb.toml");
        std::fs::write(&path, "[store\nroot = ").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
