//! Locating the NuGet.Config file to operate on.
//!
//! Resolution order, first match wins:
//!
//! 1. An explicit path (`--nugetConfigFile`)
//! 2. The `NUGET_SOURCES_CONFIG` environment variable
//! 3. The per-user default of the NuGet client:
//!    - Linux and macOS: `~/.config/NuGet/NuGet.Config`
//!    - Windows: `%APPDATA%\NuGet\NuGet.Config`

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

pub const CONFIG_ENV: &str = "NUGET_SOURCES_CONFIG";
pub const CONFIG_FILE_NAME: &str = "NuGet.Config";

#[derive(Debug)]
pub struct ConfigLocator {
    use_environment: bool,
}

impl ConfigLocator {
    pub fn new(use_environment: bool) -> Self {
        Self { use_environment }
    }

    /// Get a non-empty environment variable
    pub fn get_env(&self, var: &str) -> Option<String> {
        if !self.use_environment {
            return None;
        }

        env::var(var).ok().filter(|s| !s.trim().is_empty())
    }

    /// Resolve the configuration file path. Blank explicit paths are ignored.
    pub fn resolve(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit.filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty()) {
            return Ok(path.to_path_buf());
        }

        if let Some(path) = self.get_env(CONFIG_ENV) {
            log::debug!("Using {} from {}", path, CONFIG_ENV);
            return Ok(PathBuf::from(path));
        }

        self.default_path()
    }

    /// Per-user default path of the NuGet client on this platform
    pub fn default_path(&self) -> Result<PathBuf> {
        let dirs = directories::BaseDirs::new().ok_or(ConfigError::UnsupportedPlatform)?;

        if cfg!(windows) {
            // Roaming AppData
            Ok(dirs.config_dir().join("NuGet").join(CONFIG_FILE_NAME))
        } else if cfg!(unix) {
            Ok(dirs.home_dir().join(".config").join("NuGet").join(CONFIG_FILE_NAME))
        } else {
            Err(ConfigError::UnsupportedPlatform)
        }
    }
}

impl Default for ConfigLocator {
    fn default() -> Self {
        Self::new(true)
    }
}
