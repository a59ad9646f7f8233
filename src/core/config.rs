//! Configuration management for the gateway.
//!
//! This module provides a centralized configuration structure that can be
//! populated from a TOML file, environment variables, or defaults.

use super::transport::HttpConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::core::error::{Error, Result};

/// Main configuration structure for the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// HTTP transport configuration.
    pub transport: HttpConfig,

    /// Handler discovery configuration.
    pub handlers: HandlersConfig,

    /// Invocation configuration.
    pub dispatch: DispatchConfig,

    /// Reload watcher configuration.
    pub watcher: WatcherConfig,

    /// Catalog output configuration.
    pub catalog: CatalogConfig,

    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub origin: Option<PathBuf>,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// One directory of handler manifests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerSource {
    /// Directory to scan.
    pub dir: PathBuf,

    /// Suffix appended to every handler name from this directory
    /// (`hello` + `py` -> `hello-py`).
    #[serde(default)]
    pub tag: Option<String>,
}

impl HandlerSource {
    /// A source without a tag.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tag: None,
        }
    }

    /// Parse `dir` or `dir@tag`.
    pub fn parse(spec: &str) -> Self {
        match spec.rsplit_once('@') {
            Some((dir, tag)) if !tag.trim().is_empty() => Self {
                dir: PathBuf::from(dir.trim()),
                tag: Some(tag.trim().to_string()),
            },
            _ => Self::new(spec.trim()),
        }
    }
}

/// Handler discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlersConfig {
    /// Directories feeding the registry.
    pub sources: Vec<HandlerSource>,

    /// Descend into subdirectories.
    pub recursive: bool,

    /// Write the canonical template into empty manifests before loading.
    pub scaffold_empty: bool,

    /// Description used for handlers that have none.
    /// If None, an undocumented handler fails extraction.
    pub description_fallback: Option<String>,
}

/// Invocation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Upper bound on a single invocation, in seconds.
    pub timeout_secs: u64,
}

impl DispatchConfig {
    /// The invocation timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Reload watcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Whether to watch handler directories for changes.
    pub enabled: bool,

    /// Window over which bursts of filesystem events are coalesced.
    pub debounce_ms: u64,
}

impl WatcherConfig {
    /// The debounce window.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Catalog output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Where the catalog file is written. If None, `describe` prints to
    /// stdout and reloads do not write a file.
    pub output_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "function-gateway".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_timestamps: true,
        }
    }
}

impl Default for HandlersConfig {
    fn default() -> Self {
        Self {
            sources: vec![HandlerSource::new("functions")],
            recursive: false,
            scaffold_empty: true,
            description_fallback: None,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 250,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML; missing keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no request could be served under.
    pub fn validate(&self) -> Result<()> {
        if self.dispatch.timeout_secs == 0 {
            return Err(Error::config("dispatch.timeout_secs must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration from the file named by `GATEWAY_CONFIG` (if any),
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let base = match std::env::var("GATEWAY_CONFIG") {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .map_err(|e| Error::config(format!("cannot read {path}: {e}")))?;
                Self {
                    origin: Some(PathBuf::from(path)),
                    ..Self::from_toml(&text)?
                }
            }
            Err(_) => Self::default(),
        };

        let config = base.with_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables over the defaults.
    ///
    /// Environment variables are expected to be prefixed with `GATEWAY_`.
    /// For example: `GATEWAY_SERVER_NAME`, `GATEWAY_LOG_LEVEL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::default().with_env()
    }

    fn with_env(mut self) -> Self {
        if let Ok(name) = std::env::var("GATEWAY_SERVER_NAME") {
            self.server.name = name;
        }

        if let Ok(level) = std::env::var("GATEWAY_LOG_LEVEL") {
            self.logging.level = level;
        }

        self.transport = self.transport.with_env();

        if let Ok(dirs) = std::env::var("GATEWAY_HANDLER_DIRS") {
            let sources: Vec<_> = dirs
                .split(',')
                .filter(|spec| !spec.trim().is_empty())
                .map(HandlerSource::parse)
                .collect();
            if sources.is_empty() {
                warn!("GATEWAY_HANDLER_DIRS is set but names no directory");
            } else {
                self.handlers.sources = sources;
            }
        }

        if let Some(recursive) = env_flag("GATEWAY_HANDLER_RECURSIVE") {
            self.handlers.recursive = recursive;
        }

        if let Some(scaffold) = env_flag("GATEWAY_SCAFFOLD_EMPTY") {
            self.handlers.scaffold_empty = scaffold;
        }

        if let Ok(fallback) = std::env::var("GATEWAY_DESCRIPTION_FALLBACK") {
            self.handlers.description_fallback = Some(fallback);
        }

        if let Ok(timeout) = std::env::var("GATEWAY_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.dispatch.timeout_secs = secs,
                Err(_) => warn!("Ignoring invalid GATEWAY_TIMEOUT_SECS: {}", timeout),
            }
        }

        if let Some(enabled) = env_flag("GATEWAY_WATCH") {
            self.watcher.enabled = enabled;
        }

        if let Ok(debounce) = std::env::var("GATEWAY_DEBOUNCE_MS") {
            match debounce.parse() {
                Ok(ms) => self.watcher.debounce_ms = ms,
                Err(_) => warn!("Ignoring invalid GATEWAY_DEBOUNCE_MS: {}", debounce),
            }
        }

        if let Ok(path) = std::env::var("GATEWAY_CATALOG_PATH") {
            self.catalog.output_path = Some(PathBuf::from(path));
        }

        self
    }
}

/// Read a boolean flag; anything but "false"/"0" counts as true.
pub(crate) fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| v.to_lowercase() != "false" && v != "0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_handler_dirs_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("GATEWAY_HANDLER_DIRS", "functions/py@py, functions/ts@ts");
        }
        let config = Config::from_env();
        assert_eq!(
            config.handlers.sources,
            vec![
                HandlerSource {
                    dir: PathBuf::from("functions/py"),
                    tag: Some("py".to_string()),
                },
                HandlerSource {
                    dir: PathBuf::from("functions/ts"),
                    tag: Some("ts".to_string()),
                },
            ]
        );
        unsafe {
            std::env::remove_var("GATEWAY_HANDLER_DIRS");
        }
    }

    #[test]
    fn test_timeout_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("GATEWAY_TIMEOUT_SECS", "5");
        }
        let config = Config::from_env();
        assert_eq!(config.dispatch.timeout(), Duration::from_secs(5));
        unsafe {
            std::env::set_var("GATEWAY_TIMEOUT_SECS", "soon");
        }
        let config = Config::from_env();
        assert_eq!(config.dispatch.timeout(), Duration::from_secs(30));
        unsafe {
            std::env::remove_var("GATEWAY_TIMEOUT_SECS");
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.handlers.sources, vec![HandlerSource::new("functions")]);
        assert!(config.handlers.scaffold_empty);
        assert!(!config.handlers.recursive);
        assert_eq!(config.dispatch.timeout_secs, 30);
        assert_eq!(config.watcher.debounce(), Duration::from_millis(250));
        assert!(config.catalog.output_path.is_none());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = Config::from_toml(
            r#"
            [handlers]
            recursive = true
            sources = [{ dir = "functions", tag = "rs" }]

            [dispatch]
            timeout_secs = 10
            "#,
        )
        .unwrap();

        assert!(config.handlers.recursive);
        assert!(config.handlers.scaffold_empty);
        assert_eq!(config.handlers.sources[0].tag.as_deref(), Some("rs"));
        assert_eq!(config.dispatch.timeout_secs, 10);
        assert_eq!(config.transport.port, 8080);
    }

    #[test]
    fn test_handler_source_parse() {
        assert_eq!(HandlerSource::parse("functions"), HandlerSource::new("functions"));
        assert_eq!(
            HandlerSource::parse("functions@py").tag.as_deref(),
            Some("py")
        );
        assert_eq!(HandlerSource::parse("functions@"), HandlerSource::new("functions@"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::from_toml("[dispatch]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("GATEWAY_TIMEOUT_SECS", "0");
        }
        let result = Config::load();
        unsafe {
            std::env::remove_var("GATEWAY_TIMEOUT_SECS");
        }
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml("[handlers\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
