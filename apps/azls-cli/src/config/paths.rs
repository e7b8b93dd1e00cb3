//! Configuration paths

use crate::error::{CliError, CliResult};
use std::path::PathBuf;

/// Configuration paths for the azls CLI
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Base directory, also holding the cache files
    pub config_dir: PathBuf,
    /// Path to config.json
    pub config_file: PathBuf,
    /// Path to credentials.yaml
    pub credentials_file: PathBuf,
}

impl ConfigPaths {
    /// Get configuration paths: `~/.azls/` unless `AZLS_CONFIG_DIR` is set
    pub fn new() -> CliResult<Self> {
        Ok(Self::at(Self::get_config_dir()?))
    }

    /// Paths rooted at an explicit directory
    pub fn at(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            config_file: config_dir.join("config.json"),
            credentials_file: config_dir.join("credentials.yaml"),
            config_dir,
        }
    }

    fn get_config_dir() -> CliResult<PathBuf> {
        if let Ok(dir) = std::env::var("AZLS_CONFIG_DIR") {
            return Ok(PathBuf::from(dir));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".azls"))
    }

    /// Ensure the configuration directory exists, private to the user
    pub fn ensure_dir_exists(&self) -> CliResult<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(
                    &self.config_dir,
                    std::fs::Permissions::from_mode(0o700),
                )?;
            }
        }
        Ok(())
    }
}
