//! Configuration management for repl-playground.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::ServerConfig;
use crate::cli::Args;
use crate::session::GcConfig;
use crate::share::{SnippetStore, DEFAULT_EXTENSION, DEFAULT_SHARE_DIR};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerSection,
    /// Session lifetime configuration.
    pub sessions: SessionsSection,
    /// Snippet sharing configuration.
    pub share: ShareSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Enable graceful shutdown.
    pub graceful_shutdown: bool,
    /// Directory with the front-end assets.
    pub assets_dir: PathBuf,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            graceful_shutdown: true,
            assets_dir: PathBuf::from("public"),
        }
    }
}

/// Session lifetime section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsSection {
    /// Seconds without access before a session is evicted.
    pub idle_timeout_secs: u64,
    /// Seconds between collector sweeps.
    pub gc_interval_secs: u64,
}

impl Default for SessionsSection {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 300,
            gc_interval_secs: 1,
        }
    }
}

/// Snippet sharing section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareSection {
    /// Offer the Share action.
    pub enabled: bool,
    /// Snippet directory.
    pub dir: PathBuf,
    /// Snippet file extension.
    pub extension: String,
}

impl Default for ShareSection {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from(DEFAULT_SHARE_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or a full filter directive.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source (for testing).
    pub fn apply_env_from<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("PLAYGROUND_HOST") {
            self.server.host = host;
        }

        if let Some(port) = var("PLAYGROUND_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        if let Some(dir) = var("PLAYGROUND_SHARE_DIR").filter(|d| !d.is_empty()) {
            self.share.dir = PathBuf::from(dir);
        }

        if let Some(secs) = var("PLAYGROUND_IDLE_TIMEOUT").and_then(|s| s.parse().ok()) {
            self.sessions.idle_timeout_secs = secs;
        }

        if let Some(level) = var("PLAYGROUND_LOG_LEVEL").or_else(|| var("RUST_LOG")) {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = args.host {
            self.server.host = host.to_string();
        }

        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref dir) = args.assets {
            self.server.assets_dir = dir.clone();
        }

        if let Some(ref dir) = args.share_dir {
            self.share.dir = dir.clone();
        }

        if args.no_share {
            self.share.enabled = false;
        }

        if let Some(secs) = args.idle_timeout {
            self.sessions.idle_timeout_secs = secs;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Check values that cannot be expressed in the types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .host
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;

        if self.sessions.gc_interval_secs == 0 {
            return Err(ConfigError::InvalidGcInterval);
        }

        if self.sessions.idle_timeout_secs == 0 {
            return Err(ConfigError::InvalidIdleTimeout);
        }

        Ok(())
    }

    /// Collector timing.
    pub fn gc_config(&self) -> GcConfig {
        GcConfig::new(
            Duration::from_secs(self.sessions.gc_interval_secs),
            Duration::from_secs(self.sessions.idle_timeout_secs),
        )
    }

    /// Snippet store, or `None` when sharing is disabled.
    pub fn snippet_store(&self) -> Option<SnippetStore> {
        self.share
            .enabled
            .then(|| SnippetStore::new(self.share.dir.clone(), self.share.extension.clone()))
    }

    /// Convert to ServerConfig for the API server.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        self.validate()?;

        let mut server_config = ServerConfig::new(self.server.host.clone(), self.server.port)
            .with_gc(self.gc_config());

        if self.server.assets_dir.is_dir() {
            server_config = server_config.with_assets(self.server.assets_dir.clone());
        } else {
            tracing::warn!(
                "Asset directory {} not found, serving API only",
                self.server.assets_dir.display()
            );
        }

        if !self.server.graceful_shutdown {
            server_config = server_config.without_graceful_shutdown();
        }

        Ok(server_config)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid host address.
    InvalidHost(String),
    /// The collector interval is zero.
    InvalidGcInterval,
    /// The idle timeout is zero.
    InvalidIdleTimeout,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidHost(host) => write!(f, "invalid host address: {}", host),
            Self::InvalidGcInterval => write!(f, "gc_interval_secs must be at least 1"),
            Self::InvalidIdleTimeout => write!(f, "idle_timeout_secs must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}
