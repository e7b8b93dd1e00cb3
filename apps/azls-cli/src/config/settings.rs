//! `config.json` settings

use std::path::Path;
use std::time::Duration;

use azls_sync::{CacheConfig, ClientSettings, Endpoints, FetchStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// User settings; every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service base URLs (`graph_url`, `arm_url`, `login_url`)
    #[serde(flatten)]
    pub endpoints: Endpoints,
    /// HTTP request timeout
    pub timeout_secs: u64,
    /// Retries for throttled or transient responses
    pub max_retries: u32,
    /// Staleness windows
    pub cache: CacheConfig,
    /// Scopes fetched at once during role reconciliation; 1 is sequential
    pub scope_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            timeout_secs: 60,
            max_retries: 3,
            cache: CacheConfig::default(),
            scope_concurrency: 1,
        }
    }
}

impl Config {
    /// Load the settings file, or defaults when it does not exist
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> CliResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            endpoints: self.endpoints.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            ..ClientSettings::default()
        }
    }

    pub fn fetch_strategy(&self) -> FetchStrategy {
        FetchStrategy::from_concurrency(self.scope_concurrency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(&temp.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.endpoints.graph_url, "https://graph.microsoft.com");
        assert_eq!(config.fetch_strategy(), FetchStrategy::Sequential);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"arm_url": "http://localhost:9000", "cache": {"directory_max_age_secs": 600}}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.endpoints.arm_url, "http://localhost:9000");
        assert_eq!(config.endpoints.graph_url, "https://graph.microsoft.com");
        assert_eq!(config.cache.directory_max_age_secs, 600);
        assert_eq!(config.cache.hierarchy_max_age_secs, 604_800);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        let config = Config {
            scope_concurrency: 4,
            ..Config::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
