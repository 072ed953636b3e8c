//! Configuration module.
//!
//! Defaults → config file → environment → CLI flags, resolved once at
//! startup and handed to the controller as a `ControllerConfig`.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    ResolvedConfig, CONFIG_ENV_VAR, PAGE_SIZE_ENV_VAR,
};
