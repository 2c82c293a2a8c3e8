//! TOML Configuration File Support
//!
//! Loads the term list and engine timing from
//! `~/.config/typewriter/typewriter.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables (`TYPEWRITER_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! terms = ["Photographer", "Artist", "Developer", "Writer"]
//!
//! [engine]
//! speed = 50
//! delay = 2
//! loop = true
//! cursor = true
//! ```

mod engine;

pub use engine::{Delay, EngineConfig, Speed};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Engine section of the TOML configuration
///
/// Fields are raw numbers here and validated when applied, so a bad value
/// is reported as [`ConfigError::ValidationError`] with the offending key.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineToml {
    /// Characters per second (10..=100, step 10)
    pub speed: Option<u32>,

    /// Pause in seconds (1..=10)
    pub delay: Option<u32>,

    /// Whether to erase and cycle through terms forever
    #[serde(rename = "loop")]
    pub looping: Option<bool>,

    /// Whether the cursor is shown
    pub cursor: Option<bool>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeWriterToml {
    /// Terms to type, in order
    pub terms: Option<Vec<String>>,

    /// Engine timing section
    pub engine: EngineToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration for one typewriter
#[derive(Clone, Debug)]
pub struct TypeWriterConfigFile {
    /// Terms to type, in order
    pub terms: Vec<String>,

    /// Engine timing
    pub engine: EngineConfig,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for TypeWriterConfigFile {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            engine: EngineConfig::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl TypeWriterConfigFile {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/typewriter/typewriter.toml` or
/// `~/.config/typewriter/typewriter.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("typewriter").join("typewriter.toml"))
}

/// Load configuration from the default path, then the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed or holds
/// an invalid value. A missing config file is not an error.
pub fn load_config() -> Result<TypeWriterConfigFile, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path, then the environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read, parsed or
/// validated.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<TypeWriterConfigFile, ConfigError> {
    let mut config = load_file(path)?;
    apply_env_config(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn load_file(path: Option<PathBuf>) -> Result<TypeWriterConfigFile, ConfigError> {
    let mut config = TypeWriterConfigFile::default();

    let Some(config_path) = path else {
        return Ok(config);
    };

    if !config_path.exists() {
        tracing::debug!(
            path = %config_path.display(),
            "Config file not found, using defaults"
        );
        return Ok(config);
    }

    let toml_content =
        std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
            path: config_path.clone(),
            source: e,
        })?;

    let toml_config: TypeWriterToml = toml::from_str(&toml_content)?;
    apply_toml_config(&mut config, &toml_config)?;
    config.config_file_path = Some(config_path.clone());
    config.source = ConfigSource::File;

    tracing::info!(
        path = %config_path.display(),
        terms = config.terms.len(),
        "Loaded configuration from file"
    );

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(
    config: &mut TypeWriterConfigFile,
    toml: &TypeWriterToml,
) -> Result<(), ConfigError> {
    if let Some(ref terms) = toml.terms {
        config.terms.clone_from(terms);
    }
    if let Some(speed) = toml.engine.speed {
        config.engine.speed = Speed::new(speed)?;
    }
    if let Some(delay) = toml.engine.delay {
        config.engine.delay = Delay::new(delay)?;
    }
    if let Some(looping) = toml.engine.looping {
        config.engine.looping = looping;
    }
    if let Some(cursor) = toml.engine.cursor {
        config.engine.cursor = cursor;
    }
    Ok(())
}

fn parse_bounded<T>(
    value: &str,
    validate: fn(u32) -> Result<T, ConfigError>,
) -> Result<T, String> {
    let raw = value.trim().parse::<u32>().map_err(|e| e.to_string())?;
    validate(raw).map_err(|e| e.to_string())
}

fn parse_flag(value: &str) -> bool {
    value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Apply environment variable overrides to the config
///
/// `lookup` resolves a variable name; invalid values are logged and skipped
/// so a stray variable never prevents startup.
fn apply_env_config(config: &mut TypeWriterConfigFile, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(value) = lookup("TYPEWRITER_SPEED") {
        match parse_bounded(&value, Speed::new) {
            Ok(speed) => {
                config.engine.speed = speed;
                config.source = ConfigSource::Env;
            }
            Err(error) => tracing::warn!(%value, %error, "Ignoring TYPEWRITER_SPEED"),
        }
    }
    if let Some(value) = lookup("TYPEWRITER_DELAY") {
        match parse_bounded(&value, Delay::new) {
            Ok(delay) => {
                config.engine.delay = delay;
                config.source = ConfigSource::Env;
            }
            Err(error) => tracing::warn!(%value, %error, "Ignoring TYPEWRITER_DELAY"),
        }
    }
    if let Some(value) = lookup("TYPEWRITER_LOOP") {
        config.engine.looping = parse_flag(&value);
        config.source = ConfigSource::Env;
    }
    if let Some(value) = lookup("TYPEWRITER_CURSOR") {
        config.engine.cursor = parse_flag(&value);
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Overrides
// =============================================================================

/// Command-line overrides, applied last
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Terms override (replaces the file's list when non-empty)
    pub terms: Option<Vec<String>>,

    /// Speed override
    pub speed: Option<Speed>,

    /// Delay override
    pub delay: Option<Delay>,

    /// Loop override
    pub looping: Option<bool>,

    /// Cursor override
    pub cursor: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set terms override
    #[must_use]
    pub fn with_terms(mut self, terms: Vec<String>) -> Self {
        self.terms = Some(terms);
        self
    }

    /// Set speed override
    #[must_use]
    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Set delay override
    #[must_use]
    pub fn with_delay(mut self, delay: Delay) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set loop override
    #[must_use]
    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = Some(looping);
        self
    }

    /// Set cursor override
    #[must_use]
    pub fn with_cursor(mut self, cursor: bool) -> Self {
        self.cursor = Some(cursor);
        self
    }

    fn is_empty(&self) -> bool {
        self.terms.is_none()
            && self.speed.is_none()
            && self.delay.is_none()
            && self.looping.is_none()
            && self.cursor.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut TypeWriterConfigFile) {
        if self.is_empty() {
            return;
        }
        config.source = ConfigSource::Cli;

        if let Some(ref terms) = self.terms {
            config.terms.clone_from(terms);
        }
        if let Some(speed) = self.speed {
            config.engine.speed = speed;
        }
        if let Some(delay) = self.delay {
            config.engine.delay = delay;
        }
        if let Some(looping) = self.looping {
            config.engine.looping = looping;
        }
        if let Some(cursor) = self.cursor {
            config.engine.cursor = cursor;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = TypeWriterConfigFile::default();

        assert!(config.terms.is_empty());
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("typewriter/typewriter.toml"));
        }
    }

    #[test]
    fn test_parse_valid_toml() {
        let file = write_toml(
            r#"
terms = ["Photographer", "Artist", "Developer", "Writer"]

[engine]
speed = 50
delay = 5
loop = false
cursor = false
"#,
        );

        let config = load_file(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(
            config.terms,
            vec!["Photographer", "Artist", "Developer", "Writer"]
        );
        assert_eq!(config.engine.speed.get(), 50);
        assert_eq!(config.engine.delay.get(), 5);
        assert!(!config.engine.looping);
        assert!(!config.engine.cursor);
        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_parse_partial_toml() {
        let file = write_toml("[engine]\nspeed = 100\n");

        let config = load_file(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.engine.speed, Speed::MAX);
        assert_eq!(config.engine.delay, Delay::default());
        assert!(config.engine.looping);
        assert!(config.terms.is_empty());
    }

    #[test]
    fn test_parse_empty_toml() {
        let file = write_toml("");
        let config = load_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.source(), ConfigSource::File);
    }

    #[test]
    fn test_missing_file_graceful() {
        let config =
            load_file(Some(PathBuf::from("/nonexistent/typewriter/typewriter.toml"))).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_no_path_uses_defaults() {
        let config = load_file(None).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = write_toml("[engine\nspeed = \"fast\"\n");

        let result = load_file(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_out_of_range_value_error() {
        let file = write_toml("[engine]\nspeed = 35\n");

        let result = load_file(Some(file.path().to_path_buf()));
        match result {
            Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("35")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_toml("[engine]\nspeed = 20\nloop = true\n");
        let mut config = load_file(Some(file.path().to_path_buf())).unwrap();

        apply_env_config(
            &mut config,
            env(&[("TYPEWRITER_SPEED", "80"), ("TYPEWRITER_LOOP", "false")]),
        );

        assert_eq!(config.engine.speed.get(), 80);
        assert!(!config.engine.looping);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = TypeWriterConfigFile::default();

        apply_env_config(
            &mut config,
            env(&[("TYPEWRITER_SPEED", "fast"), ("TYPEWRITER_DELAY", "42")]),
        );

        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_env_flags() {
        let mut config = TypeWriterConfigFile::default();
        apply_env_config(&mut config, env(&[("TYPEWRITER_CURSOR", "0")]));
        assert!(!config.engine.cursor);

        apply_env_config(&mut config, env(&[("TYPEWRITER_CURSOR", "yes")]));
        assert!(config.engine.cursor);
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = TypeWriterConfigFile::default();
        apply_env_config(&mut config, env(&[("TYPEWRITER_DELAY", "7")]));

        ConfigOverrides::new()
            .with_delay(Delay::MIN)
            .with_terms(vec!["hi".to_string()])
            .apply(&mut config);

        assert_eq!(config.engine.delay, Delay::MIN);
        assert_eq!(config.terms, vec!["hi"]);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_config_overrides_empty_no_change() {
        let mut config = TypeWriterConfigFile::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ValidationError("speed must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: speed must be positive"
        );
    }
}
