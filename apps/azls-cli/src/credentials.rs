//! Service principal credentials file (`credentials.yaml`)

use std::io::Write;
use std::path::Path;

use azls_sync::ClientCredentials;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CliError, CliResult};

/// Tenant, client id and secret used for client-credentials sign-in.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

#[derive(Serialize)]
struct CredentialsFile<'a> {
    tenant_id: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct StoredCredentials {
    tenant_id: String,
    client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Build credentials, rejecting ids that are not UUIDs
    pub fn new(tenant_id: &str, client_id: &str, client_secret: SecretString) -> CliResult<Self> {
        let credentials = Self {
            tenant_id: tenant_id.trim().to_lowercase(),
            client_id: client_id.trim().to_lowercase(),
            client_secret,
        };
        credentials.validate()?;
        Ok(credentials)
    }

    fn validate(&self) -> CliResult<()> {
        validate_uuid("tenant id", &self.tenant_id)?;
        validate_uuid("client id", &self.client_id)?;
        if self.client_secret.expose_secret().is_empty() {
            return Err(CliError::Validation("Client secret is empty".to_string()));
        }
        Ok(())
    }

    /// Load and validate the credentials file
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Err(CliError::NotLoggedIn);
        }
        let content = std::fs::read_to_string(path)?;
        let stored: StoredCredentials = serde_yaml::from_str(&content)
            .map_err(|e| CliError::Credentials(format!("{}: {}", path.display(), e)))?;
        let credentials = Self {
            tenant_id: stored.tenant_id,
            client_id: stored.client_id,
            client_secret: stored.client_secret.into(),
        };
        credentials
            .validate()
            .map_err(|e| CliError::Credentials(format!("{}: {}", path.display(), e)))?;
        Ok(credentials)
    }

    /// Write the credentials file, readable by the owner only
    pub fn save(&self, path: &Path) -> CliResult<()> {
        let content = serde_yaml::to_string(&CredentialsFile {
            tenant_id: &self.tenant_id,
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
        })?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;
        file.write_all(content.as_bytes())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    /// Secret with all but the first three characters hidden
    pub fn masked_secret(&self) -> String {
        let secret = self.client_secret.expose_secret();
        let shown: String = secret.chars().take(3).collect();
        format!("{shown}{}", "*".repeat(secret.chars().count().saturating_sub(3)))
    }

    pub fn client_credentials(&self) -> ClientCredentials {
        ClientCredentials {
            tenant_id: self.tenant_id.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }
}

fn validate_uuid(label: &str, value: &str) -> CliResult<()> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| CliError::Validation(format!("'{value}' is not a valid {label} UUID")))
}
