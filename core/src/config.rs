// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

use davsync_decsync::app_id;

/// The name of the davsync application.
pub const APP_NAME: &str = "davsync";

/// Environment variable overriding the default sync log directory.
pub const DECSYNC_DIR_ENV: &str = "DECSYNC_DIR";

/// Configuration of the bridge.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Root of the local collection storage.
    pub storage_root: PathBuf,

    /// Root of the shared sync log.
    #[serde(default)]
    pub decsync_dir: Option<PathBuf>,

    /// Application name used to derive the app id.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Identity of this writer in the sync log, `<hostname>-<app_name>` if unset.
    #[serde(default)]
    pub app_id: Option<String>,
}

impl Config {
    /// Creates a configuration with defaults for everything but the storage root.
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
            decsync_dir: None,
            app_name: default_app_name(),
            app_id: None,
        }
    }

    /// Normalize the configuration.
    ///
    /// Expands home and config prefixes in paths and fills in the sync log
    /// directory and app id, so both are `Some` afterwards.
    pub fn normalize(&mut self) -> Result<(), Box<dyn Error>> {
        self.storage_root = expand_path(&self.storage_root)
            .map_err(|e| format!("Failed to expand storage root path: {e}"))?;

        self.decsync_dir = Some(match &self.decsync_dir {
            Some(a) => expand_path(a)
                .map_err(|e| format!("Failed to expand decsync directory path: {e}"))?,
            None => default_decsync_dir()?,
        });

        if self.app_id.is_none() {
            let id = app_id(&self.app_name);
            tracing::debug!(app_id = %id, "derived app id");
            self.app_id = Some(id);
        }

        Ok(())
    }
}

fn default_app_name() -> String {
    APP_NAME.to_string()
}

/// `$DECSYNC_DIR` if set, otherwise `decsync` in the user data directory.
fn default_decsync_dir() -> Result<PathBuf, Box<dyn Error>> {
    match env::var_os(DECSYNC_DIR_ENV) {
        Some(dir) if !dir.is_empty() => expand_path(Path::new(&dir)),
        _ => Ok(get_data_dir()?.join("decsync")),
    }
}

/// Handle tilde (~) and environment variables in the path
fn expand_path(path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let path = path.to_str().ok_or("Invalid path")?;

    // Handle tilde and home directory
    let home_prefixes: &[&str] = if cfg!(unix) {
        &["~/", "$HOME/", "${HOME}/"]
    } else {
        &[r"~\", "~/", r"%UserProfile%\", r"%UserProfile%/"]
    };
    for prefix in home_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_home_dir()?.join(stripped));
        }
    }

    // Handle config directories
    let config_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_CONFIG_HOME/", "${XDG_CONFIG_HOME}/"]
    } else {
        &[r"%LOCALAPPDATA%\", "%LOCALAPPDATA%/"]
    };
    for prefix in config_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_config_dir()?.join(stripped));
        }
    }

    Ok(path.into())
}

fn get_home_dir() -> Result<PathBuf, Box<dyn Error>> {
    dirs::home_dir().ok_or("User-specific home directory not found".into())
}

fn get_config_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(windows)]
    let config_dir = dirs::config_dir();
    config_dir.ok_or("User-specific config directory not found".into())
}

fn get_data_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let data_dir = xdg::BaseDirectories::new().get_data_home();
    #[cfg(windows)]
    let data_dir = dirs::data_dir();
    data_dir.ok_or("User-specific data directory not found".into())
}
