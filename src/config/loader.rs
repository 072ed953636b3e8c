//! Configuration file loading with precedence handling.

use crate::state::{ControllerConfig, DebounceDelays};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SCROLLSEARCH_CONFIG";

/// Environment variable overriding the page size.
pub const PAGE_SIZE_ENV_VAR: &str = "SCROLLSEARCH_PAGE_SIZE";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A setting parsed but cannot be used.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Setting name as written in the config file.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/scrollsearch/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Settle time after a keystroke in the query box.
    #[serde(default)]
    pub text_debounce_ms: Option<u64>,

    /// Settle time after a filter or sort change.
    #[serde(default)]
    pub filter_debounce_ms: Option<u64>,

    /// Items per page request.
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Distance from the end of content that triggers the next page.
    #[serde(default)]
    pub scroll_threshold: Option<f32>,

    /// Quiet period after an appended page.
    #[serde(default)]
    pub load_cooldown_ms: Option<u64>,

    /// Artificial delay added to every catalog request.
    #[serde(default)]
    pub source_latency_ms: Option<u64>,

    /// Give up on a page request after this long. Zero disables.
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Debounce after a query text edit, in milliseconds.
    pub text_debounce_ms: u64,
    /// Debounce after a filter or sort change, in milliseconds.
    pub filter_debounce_ms: u64,
    /// Items per page.
    pub page_size: usize,
    /// Near-end distance in content units.
    pub scroll_threshold: f32,
    /// Quiet period after a continuation page, in milliseconds.
    pub load_cooldown_ms: u64,
    /// Artificial latency added by the catalog source.
    pub source_latency_ms: u64,
    /// Fetch timeout in milliseconds; 0 disables.
    pub fetch_timeout_ms: u64,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let core = ControllerConfig::default();
        Self {
            text_debounce_ms: core.delays.text.as_millis() as u64,
            filter_debounce_ms: core.delays.structured.as_millis() as u64,
            page_size: core.page_size,
            scroll_threshold: core.scroll_threshold,
            load_cooldown_ms: core.load_cooldown.as_millis() as u64,
            source_latency_ms: 0,
            fetch_timeout_ms: 10_000,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Reject settings the controller cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero page size or a
    /// negative or non-finite scroll threshold.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.scroll_threshold.is_finite() || self.scroll_threshold < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "scroll_threshold",
                reason: format!("must be a non-negative number, got {}", self.scroll_threshold),
            });
        }
        Ok(self)
    }

    /// Tunables for the search controller.
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            page_size: self.page_size,
            delays: DebounceDelays {
                text: Duration::from_millis(self.text_debounce_ms),
                structured: Duration::from_millis(self.filter_debounce_ms),
            },
            scroll_threshold: self.scroll_threshold,
            load_cooldown: Duration::from_millis(self.load_cooldown_ms),
        }
    }

    /// Artificial source latency as a `Duration`.
    pub fn source_latency(&self) -> Duration {
        Duration::from_millis(self.source_latency_ms)
    }

    /// `None` when timeouts are disabled.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_ms > 0).then(|| Duration::from_millis(self.fetch_timeout_ms))
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/scrollsearch/scrollsearch.log` on Unix-like
/// systems, or the platform's state directory elsewhere.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("scrollsearch").join("scrollsearch.log")
    } else {
        PathBuf::from("scrollsearch.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
/// Returns `Err` if file exists but cannot be read or parsed.
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/scrollsearch/config.toml` on Unix, appropriate path on
/// other platforms. Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scrollsearch").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (like CLI `--config`)
/// 2. `SCROLLSEARCH_CONFIG` environment variable
/// 3. Default path `~/.config/scrollsearch/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed,
/// or if `SCROLLSEARCH_CONFIG` is set but empty.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Some(env_path) = std::env::var_os(CONFIG_ENV_VAR) {
        if env_path.is_empty() {
            return Err(ConfigError::InvalidPath(format!("{CONFIG_ENV_VAR} is empty")));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        text_debounce_ms: config.text_debounce_ms.unwrap_or(defaults.text_debounce_ms),
        filter_debounce_ms: config
            .filter_debounce_ms
            .unwrap_or(defaults.filter_debounce_ms),
        page_size: config.page_size.unwrap_or(defaults.page_size),
        scroll_threshold: config.scroll_threshold.unwrap_or(defaults.scroll_threshold),
        load_cooldown_ms: config.load_cooldown_ms.unwrap_or(defaults.load_cooldown_ms),
        source_latency_ms: config
            .source_latency_ms
            .unwrap_or(defaults.source_latency_ms),
        fetch_timeout_ms: config.fetch_timeout_ms.unwrap_or(defaults.fetch_timeout_ms),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `SCROLLSEARCH_PAGE_SIZE`: Override page size
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if the variable is set but is not a
/// number.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(raw) = std::env::var(PAGE_SIZE_ENV_VAR) {
        config.page_size = raw
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                field: "page_size",
                reason: format!("{PAGE_SIZE_ENV_VAR}={raw:?}: {e}"),
            })?;
    }

    Ok(config)
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    page_size_override: Option<usize>,
    latency_override: Option<u64>,
) -> ResolvedConfig {
    if let Some(page_size) = page_size_override {
        config.page_size = page_size;
    }

    if let Some(latency) = latency_override {
        config.source_latency_ms = latency;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
