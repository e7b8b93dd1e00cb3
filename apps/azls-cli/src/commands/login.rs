//! `azls login` - save service principal credentials

use std::io::IsTerminal;

use clap::Args;
use dialoguer::Password;
use secrecy::SecretString;

use crate::config::ConfigPaths;
use crate::credentials::Credentials;
use crate::error::{CliError, CliResult};
use crate::output::{print_key_value, print_success};

/// Arguments for the login command
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Directory (tenant) id
    pub tenant_id: String,

    /// Application (client) id of the service principal
    pub client_id: String,

    /// Client secret; prompted for when omitted
    pub secret: Option<String>,
}

/// Execute the login command
///
/// Only writes the credentials file; tokens are requested on first use.
pub async fn execute(args: LoginArgs) -> CliResult<()> {
    let secret = match args.secret {
        Some(secret) => secret,
        None if std::io::stdin().is_terminal() => {
            Password::new().with_prompt("Client secret").interact()?
        }
        None => {
            return Err(CliError::Validation(
                "Client secret required in non-interactive mode.".to_string(),
            ))
        }
    };
    let credentials = Credentials::new(&args.tenant_id, &args.client_id, SecretString::from(secret))?;

    let paths = ConfigPaths::new()?;
    paths.ensure_dir_exists()?;
    credentials.save(&paths.credentials_file)?;

    print_success("Credentials saved.");
    print_key_value("Tenant", &credentials.tenant_id);
    print_key_value("Client", &credentials.client_id);
    print_key_value("File", &paths.credentials_file.display().to_string());
    Ok(())
}
