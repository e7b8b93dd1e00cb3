//! CLI command implementations

pub mod clear;
pub mod config;
pub mod list;
pub mod login;
pub mod report;
pub mod show;
pub mod status;
pub mod tree;

use std::sync::Arc;

use azls_sync::{CacheStore, ClientCredentialTokens, HttpApiClient, Inventory, ObjectType};

use crate::config::{Config, ConfigPaths};
use crate::credentials::Credentials;
use crate::error::CliResult;
use crate::logging::LogLevel;
use crate::output::TerminalProgress;

/// Options shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Globals {
    pub level: LogLevel,
}

impl Globals {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }
}

/// Parse an object type key (`u`, `sp`, ...) or resource name.
pub fn parse_object_type(s: &str) -> Result<ObjectType, String> {
    s.parse::<ObjectType>().map_err(|_| {
        let keys: Vec<String> = ObjectType::ALL
            .iter()
            .map(|t| format!("{} ({})", t.key(), t.resource()))
            .collect();
        format!("unknown object type '{s}', expected one of: {}", keys.join(", "))
    })
}

/// Cache store for the logged-in tenant, without network access.
pub fn open_store(paths: &ConfigPaths) -> CliResult<CacheStore> {
    paths.ensure_dir_exists()?;
    let credentials = Credentials::load(&paths.credentials_file)?;
    Ok(CacheStore::new(&paths.config_dir, credentials.tenant_id))
}

/// Inventory wired to the real APIs for the logged-in tenant.
pub fn open_inventory(globals: &Globals) -> CliResult<Inventory> {
    let paths = ConfigPaths::new()?;
    paths.ensure_dir_exists()?;
    let config = Config::load(&paths.config_file)?;
    let credentials = Credentials::load(&paths.credentials_file)?;
    build_inventory(&paths, &config, &credentials, globals)
}

pub fn build_inventory(
    paths: &ConfigPaths,
    config: &Config,
    credentials: &Credentials,
    globals: &Globals,
) -> CliResult<Inventory> {
    let settings = config.client_settings();
    let http = HttpApiClient::build_http(settings.timeout)?;
    let tokens = ClientCredentialTokens::new(
        http.clone(),
        credentials.client_credentials(),
        &settings.endpoints,
    );
    let client = HttpApiClient::new(http, Arc::new(tokens), settings);

    let mut inventory = Inventory::new(
        Arc::new(client),
        CacheStore::new(&paths.config_dir, credentials.tenant_id.clone()),
        config.endpoints.clone(),
    )
    .with_cache_config(config.cache.clone())
    .with_strategy(config.fetch_strategy());
    if globals.level.shows_progress() {
        inventory = inventory.with_progress(Arc::new(TerminalProgress::new()));
    }
    Ok(inventory)
}
