use std::path::{Path, PathBuf};

use {
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, warn},
};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::HushConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["hush.toml", "hush.yaml", "hush.yml", "hush.json"];

/// A parsed config together with the file it came from, if any.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: HushConfig,
    pub path: Option<PathBuf>,
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<HushConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Load the config file named on the command line, or discover one in the
/// standard locations, then apply environment fallbacks.
///
/// Search order when `explicit` is `None`:
/// 1. `./hush.{toml,yaml,yml,json}`
/// 2. `~/.config/hush/hush.{toml,yaml,yml,json}`
///
/// A missing file yields defaults (an env-only setup is valid). A file that
/// exists but does not parse is an error: falling back to defaults would
/// silently drop `allowed_chats`.
pub fn discover_and_load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => find_config_file(),
    };

    let mut config = match path {
        Some(ref p) => {
            debug!(path = %p.display(), "loading config");
            load_config(p)?
        },
        None => {
            debug!("no config file found, using defaults");
            HushConfig::default()
        },
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(LoadedConfig { config, path })
}

/// Fill credentials from the environment variables the bot has always used
/// (`BOT_TOKEN`, `ADMIN_USER_ID`) when the file leaves them unset.
pub(crate) fn apply_env_overrides(
    config: &mut HushConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    // A leftover placeholder means the variable was never set.
    if config.telegram.token.expose_secret().starts_with("${") {
        config.telegram.token = Secret::new(String::new());
    }

    if !config.telegram.has_token()
        && let Some(token) = lookup("BOT_TOKEN").filter(|t| !t.trim().is_empty())
    {
        config.telegram.token = Secret::new(token);
    }

    if config.telegram.operator_id.is_none()
        && let Some(raw) = lookup("ADMIN_USER_ID")
    {
        match raw.trim().parse::<u64>() {
            Ok(0) => {},
            Ok(id) => config.telegram.operator_id = Some(id),
            Err(e) => warn!(value = %raw, error = %e, "ignoring malformed ADMIN_USER_ID"),
        }
    }
}

/// Resolve the registry file against the data directory.
///
/// Absolute paths are used as-is; relative paths are joined onto
/// `data_dir`, or onto the working directory when none is given.
pub fn resolve_registry_path(config: &HushConfig, data_dir: Option<&Path>) -> PathBuf {
    let path = &config.silence.registry_path;
    if path.is_absolute() {
        return path.clone();
    }
    match data_dir {
        Some(dir) => dir.join(path),
        None => path.clone(),
    }
}

/// Returns the user-global config directory (`~/.config/hush/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "hush").map(|d| d.config_dir().to_path_buf())
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

fn parse_config(raw: &str, path: &Path) -> Result<HushConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    let context = || format!("failed to parse {}", path.display());
    match ext {
        "toml" => toml::from_str::<HushConfig>(raw).with_context(context),
        "yaml" | "yml" => serde_yaml::from_str::<HushConfig>(raw).with_context(context),
        "json" => serde_json::from_str::<HushConfig>(raw).with_context(context),
        other => Err(Error::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}
