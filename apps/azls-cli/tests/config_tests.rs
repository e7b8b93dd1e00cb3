//! Integration tests for configuration discovery
//!
//! Environment variables are process-wide, so everything touching
//! `AZLS_CONFIG_DIR` lives in one test.

use azls_cli::commands::open_store;
use azls_cli::config::{Config, ConfigPaths};
use azls_cli::credentials::Credentials;
use azls_cli::error::CliError;
use tempfile::TempDir;

#[test]
fn test_config_dir_override_and_login_flow() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("azls-home");
    std::env::set_var("AZLS_CONFIG_DIR", &dir);

    let paths = ConfigPaths::new().unwrap();
    assert_eq!(paths.config_dir, dir);
    assert_eq!(paths.config_file, dir.join("config.json"));

    // Nothing saved yet: defaults and no credentials.
    assert_eq!(Config::load(&paths.config_file).unwrap(), Config::default());
    assert!(matches!(open_store(&paths), Err(CliError::NotLoggedIn)));
    assert!(paths.config_dir.is_dir());

    let credentials = Credentials::new(
        "11111111-1111-1111-1111-111111111111",
        "22222222-2222-2222-2222-222222222222",
        "s3cret".to_string().into(),
    )
    .unwrap();
    credentials.save(&paths.credentials_file).unwrap();

    let store = open_store(&paths).unwrap();
    assert_eq!(store.tenant_id(), "11111111-1111-1111-1111-111111111111");
    assert_eq!(store.dir(), dir.as_path());

    std::env::remove_var("AZLS_CONFIG_DIR");
}
