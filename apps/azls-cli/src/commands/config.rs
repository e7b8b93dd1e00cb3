//! `azls config` - show effective configuration

use crate::config::{Config, ConfigPaths};
use crate::credentials::Credentials;
use crate::error::{CliError, CliResult};
use crate::output::{print_key_value, print_warning};

/// Execute the config command
pub async fn execute() -> CliResult<()> {
    let paths = ConfigPaths::new()?;
    let config = Config::load(&paths.config_file)?;

    println!("Configuration:");
    for (key, value) in describe(&paths, &config) {
        print_key_value(key, &value);
    }

    println!("\nCredentials:");
    match Credentials::load(&paths.credentials_file) {
        Ok(credentials) => {
            print_key_value("Tenant", &credentials.tenant_id);
            print_key_value("Client", &credentials.client_id);
            print_key_value("Secret", &credentials.masked_secret());
        }
        Err(CliError::NotLoggedIn) => print_warning("Not logged in. Run 'azls login'."),
        Err(e) => print_warning(&e.to_string()),
    }
    Ok(())
}

/// Key/value lines describing the effective settings.
pub fn describe(paths: &ConfigPaths, config: &Config) -> Vec<(&'static str, String)> {
    let cache = &config.cache;
    vec![
        ("Directory", paths.config_dir.display().to_string()),
        ("Graph URL", config.endpoints.graph_url.clone()),
        ("ARM URL", config.endpoints.arm_url.clone()),
        ("Login URL", config.endpoints.login_url.clone()),
        ("Timeout", format!("{}s", config.timeout_secs)),
        ("Max retries", config.max_retries.to_string()),
        (
            "Directory cache",
            format!("{}s", cache.directory_max_age_secs),
        ),
        (
            "Hierarchy cache",
            format!("{}s", cache.hierarchy_max_age_secs),
        ),
        (
            "Delta link max age",
            format!("{}s", cache.delta_link_max_age_secs),
        ),
        ("Scope concurrency", config.scope_concurrency.to_string()),
    ]
}
