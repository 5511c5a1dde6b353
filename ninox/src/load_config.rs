//! `load_config` module: locates and reads the ninox TOML config file.
//!
//! Parsing and validation of the document itself happens in
//! [`ninox_core::config::Config::from_toml_str`]; this module deals with the
//! filesystem side: `~` expansion, the per-user default location, and the
//! menu-tree rule of falling back to `./config.toml` (or asking the user
//! whether to continue without one).
//!
//! # Errors
//! A path that does not exist is reported as [`ConfigError::NotFound`], so the
//! CLI can tell "no such file" apart from "the file is malformed".

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use ninox_core::config::{Config, DescriptionMap};
use ninox_core::contract::Prompter;
use ninox_core::error::ConfigError;
use tracing::{error, info, warn};

use crate::cli::Aborted;

/// File name looked up in the working directory by `menu-tree`.
pub const LOCAL_CONFIG_FILE: &str = "config.toml";

pub const MISSING_CONFIG_PROMPT: &str =
    "No config.toml found. Continue without ship descriptions?";

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// `~/.config/ninox/config.toml`, where the git helpers look for API tokens.
pub fn default_config_path() -> PathBuf {
    expand_tilde(Path::new("~/.config/ninox/config.toml"))
}

/// Read and validate a config file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = expand_tilde(path.as_ref());
    info!(config_path = ?path, "Loading configuration from file");

    if !path.is_file() {
        error!(config_path = ?path, "Config file not found");
        return Err(ConfigError::NotFound(path));
    }

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(ConfigError::Read { path, source: e });
        }
    };

    match Config::from_toml_str(&content) {
        Ok(config) => {
            config.trace_loaded();
            Ok(config)
        }
        Err(e) => {
            error!(error = %e, config_path = ?path, "Failed to parse config TOML");
            Err(e)
        }
    }
}

/// Ship descriptions for `menu-tree`.
///
/// An explicit path must exist. Without one, `./config.toml` in `cwd` is used
/// when present; otherwise the user is asked whether to go on without
/// descriptions, and declining aborts.
pub fn resolve_menu_descriptions<P>(
    explicit: Option<&Path>,
    cwd: &Path,
    prompter: &P,
) -> Result<DescriptionMap>
where
    P: Prompter + ?Sized,
{
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let local = cwd.join(LOCAL_CONFIG_FILE);
            if local.is_file() {
                info!(config_path = ?local, "Using config from working directory");
                local
            } else {
                warn!(cwd = ?cwd, "No config.toml in working directory");
                if !prompter.confirm(MISSING_CONFIG_PROMPT, false).map_err(anyhow::Error::msg)? {
                    return Err(Aborted.into());
                }
                return Ok(DescriptionMap::new());
            }
        }
    };
    Ok(load_config(path)?.descriptions)
}
