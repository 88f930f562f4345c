//! Configuration management for cargo-markdown.
//!
//! Parses `cargo-markdown.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `hot_reload.public_host`

mod expand;

use std::path::{Path, PathBuf};

use preview_theme::ThemeVariant;
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server port.
    pub port: Option<u16>,
    /// Override the hostname advertised to the browser for hot reload.
    pub public_host: Option<String>,
    /// Override hot reload enabled flag.
    pub hot_reload_enabled: Option<bool>,
    /// Override theme variant.
    pub theme: Option<ThemeVariant>,
    /// Override browser auto-open flag.
    pub open_browser: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "cargo-markdown.toml";

/// Loopback address used when nothing else is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Hot reload configuration.
    pub hot_reload: HotReloadConfig,
    /// Theme configuration.
    pub theme: ThemeConfig,
    /// Browser configuration.
    pub browser: BrowserConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub host: String,
    /// Port to listen on (0 lets the OS choose).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: 8080,
        }
    }
}

/// Hot reload configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HotReloadConfig {
    /// Whether hot reload is enabled.
    pub enabled: bool,
    /// Hostname the browser uses to reach the hot reload socket.
    ///
    /// Defaults to `server.host`. Set it when the page is reached through a
    /// tunnel; the browser then connects on port 80.
    pub public_host: Option<String>,
    /// Delay before the browser retries a dropped connection.
    pub retry_delay_ms: u64,
    /// Debounce window for filesystem events.
    pub debounce_ms: u64,
    /// Extra glob patterns, relative to the README directory, that also trigger a reload.
    pub watch_patterns: Vec<String>,
}

impl Default for HotReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            public_host: None,
            retry_delay_ms: 5000,
            debounce_ms: 100,
            watch_patterns: Vec::new(),
        }
    }
}

/// Theme configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Bundled theme document used for `/theme.css`.
    pub variant: ThemeVariant,
}

/// Browser configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Open the default browser on startup.
    pub open: bool,
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
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`PREVIEW_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `cargo-markdown.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
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
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Hostname advertised to the browser for the hot reload socket.
    #[must_use]
    pub fn public_host(&self) -> &str {
        self.hot_reload
            .public_host
            .as_deref()
            .unwrap_or(&self.server.host)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(public_host) = &settings.public_host {
            self.hot_reload.public_host = Some(public_host.clone());
        }
        if let Some(enabled) = settings.hot_reload_enabled {
            self.hot_reload.enabled = enabled;
        }
        if let Some(theme) = settings.theme {
            self.theme.variant = theme;
        }
        if let Some(open) = settings.open_browser {
            self.browser.open = open;
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if let Some(ref public_host) = self.hot_reload.public_host {
            require_non_empty(public_host, "hot_reload.public_host")?;
        }
        if self.hot_reload.retry_delay_ms == 0 {
            return Err(ConfigError::Validation(
                "hot_reload.retry_delay_ms must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref host) = self.hot_reload.public_host {
            self.hot_reload.public_host =
                Some(expand::expand_env(host, "hot_reload.public_host")?);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert!(config.hot_reload.enabled);
        assert_eq!(config.hot_reload.retry_delay_ms, 5000);
        assert_eq!(config.hot_reload.debounce_ms, 100);
        assert_eq!(config.theme.variant, ThemeVariant::Crates);
        assert!(!config.browser.open);
        assert_eq!(config.public_host(), "127.0.0.1");
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.hot_reload.watch_patterns.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 0

[hot_reload]
enabled = false
public_host = "abc.ngrok.io"
retry_delay_ms = 1000
debounce_ms = 250
watch_patterns = ["docs/**/*.md"]

[theme]
variant = "readme"

[browser]
open = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 0);
        assert!(!config.hot_reload.enabled);
        assert_eq!(config.public_host(), "abc.ngrok.io");
        assert_eq!(config.hot_reload.retry_delay_ms, 1000);
        assert_eq!(config.hot_reload.debounce_ms, 250);
        assert_eq!(config.hot_reload.watch_patterns, vec!["docs/**/*.md".to_owned()]);
        assert_eq!(config.theme.variant, ThemeVariant::Readme);
        assert!(config.browser.open);
    }

    #[test]
    fn test_parse_unknown_theme_fails() {
        let result: Result<Config, _> = toml::from_str("[theme]\nvariant = \"docs\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_cli_settings_port() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            port: Some(9000),
            ..Default::default()
        });

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_multiple() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            public_host: Some("example.ngrok.io".to_owned()),
            hot_reload_enabled: Some(false),
            theme: Some(ThemeVariant::Readme),
            open_browser: Some(true),
            ..Default::default()
        });

        assert_eq!(config.public_host(), "example.ngrok.io");
        assert!(!config.hot_reload.enabled);
        assert_eq!(config.theme.variant, ThemeVariant::Readme);
        assert!(config.browser.open);
        assert_eq!(config.server.port, 8080); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.hot_reload.public_host, None);
        assert!(config.hot_reload.enabled);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/cargo-markdown.toml")), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_sets_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[server]\nport = 3000\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_cli_settings_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[server]\nport = 3000\n").unwrap();

        let settings = CliSettings {
            port: Some(4000),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_expand_env_vars_public_host() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("PREVIEW_TEST_PUBLIC_HOST", "tunnel.example.com");
        }

        let toml = r#"
[hot_reload]
public_host = "${PREVIEW_TEST_PUBLIC_HOST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.public_host(), "tunnel.example.com");

        unsafe {
            std::env::remove_var("PREVIEW_TEST_PUBLIC_HOST");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PREVIEW_TEST_MISSING_HOST");
        }

        let toml = r#"
[server]
host = "${PREVIEW_TEST_MISSING_HOST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("server.host"));
    }

    // Validation tests

    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(msg.contains(s), "Expected error to contain '{s}', got: {msg}");
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_server_host_empty() {
        let mut config = Config::default();
        config.server.host = String::new();
        assert_validation_error(&config, &["server.host", "empty"]);
    }

    #[test]
    fn test_validate_public_host_blank() {
        let mut config = Config::default();
        config.hot_reload.public_host = Some("  ".to_owned());
        assert_validation_error(&config, &["hot_reload.public_host"]);
    }

    #[test]
    fn test_validate_retry_delay_zero() {
        let mut config = Config::default();
        config.hot_reload.retry_delay_ms = 0;
        assert_validation_error(&config, &["retry_delay_ms", "greater than 0"]);
    }
}
