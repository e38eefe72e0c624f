// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, fs, path::PathBuf, str::FromStr};

use davsync_core::{APP_NAME, Config as CoreConfig};

const DAVSYNC_CONFIG_ENV: &str = "DAVSYNC_CONFIG";

/// Reads the configuration from `path`, `$DAVSYNC_CONFIG` or the user
/// config directory, in that order.
#[tracing::instrument]
pub fn parse_config(path: Option<PathBuf>) -> Result<CoreConfig, Box<dyn Error>> {
    let path = match path {
        Some(path) => path,
        None => match std::env::var_os(DAVSYNC_CONFIG_ENV) {
            Some(env_path) => PathBuf::from(env_path),
            None => {
                let config = get_config_dir()?.join(APP_NAME).join("config.toml");
                if !config.exists() {
                    return Err(format!("No config found at: {}", config.display()).into());
                }
                config
            }
        },
    };

    let raw = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read config file at {}: {e}", path.display()))?
        .parse::<ConfigRaw>()
        .map_err(|e| format!("Failed to parse config file at {}: {e}", path.display()))?;
    Ok(raw.0)
}

#[derive(Debug)]
struct ConfigRaw(CoreConfig);

impl FromStr for ConfigRaw {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(toml::from_str(s)?))
    }
}

fn get_config_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(windows)]
    let config_dir = dirs::config_dir();
    config_dir.ok_or_else(|| "User-specific config directory not found".into())
}
