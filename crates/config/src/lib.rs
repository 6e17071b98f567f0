//! Configuration loading, validation and env substitution for hush.
//!
//! Config files: `hush.toml`, `hush.yaml`, `hush.yml` or `hush.json`,
//! searched in `./` then `~/.config/hush/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw
//! file before parsing.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{LoadedConfig, config_dir, discover_and_load, load_config, resolve_registry_path},
    schema::{HushConfig, SilenceConfig, TelegramConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
