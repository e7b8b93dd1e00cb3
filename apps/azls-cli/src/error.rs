//! CLI error types and exit codes

use azls_sync::{ErrorClass, SyncError};
use thiserror::Error;

use crate::output::use_color;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error (config, cache, I/O)
/// - 2: Authentication required or failed
/// - 3: Network error
/// - 4: Validation error
/// - 5: Remote API error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("No credentials found. Run 'azls login' first.")]
    NotLoggedIn,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("API error: {code} - {message}")]
    Api { code: String, message: String },

    #[error("Unexpected API response: {0}")]
    Shape(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential file error: {0}")]
    Credentials(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Input error: {0}")]
    InputError(String),

    #[error("Aborted by user")]
    Aborted,
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotLoggedIn | CliError::AuthenticationFailed(_) => 2,
            CliError::Network(_) => 3,
            CliError::Validation(_) | CliError::NotFound(_) => 4,
            CliError::Api { code, .. } => {
                if code == "401" || code == "403" || code.starts_with("Authorization") {
                    2
                } else {
                    5
                }
            }
            CliError::Shape(_) => 5,
            CliError::Config(_)
            | CliError::Credentials(_)
            | CliError::Cache(_)
            | CliError::Io(_)
            | CliError::InputError(_) => 1,
            CliError::Aborted => 0,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        eprint!("{}", self.render(use_color()));
    }

    fn render(&self, color: bool) -> String {
        let mut out = if color {
            format!("\x1b[31mError:\x1b[0m {}\n", self)
        } else {
            format!("Error: {}\n", self)
        };

        if let Some(suggestion) = self.suggestion() {
            if color {
                out.push_str(&format!("\n\x1b[33mSuggestion:\x1b[0m {}\n", suggestion));
            } else {
                out.push_str(&format!("\nSuggestion: {}\n", suggestion));
            }
        }
        out
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::NotLoggedIn => Some("Run 'azls login <TENANT_ID> <CLIENT_ID> <SECRET>'."),
            CliError::AuthenticationFailed(_) => {
                Some("Check the client id and secret with 'azls config', then run 'azls login' again.")
            }
            CliError::Api { code, .. } if code.starts_with("Authorization") => {
                Some("The service principal needs a reader role on the scopes being listed.")
            }
            CliError::Cache(_) => Some("Run 'azls clear all' to start from an empty cache."),
            _ => None,
        }
    }
}

impl From<SyncError> for CliError {
    fn from(e: SyncError) -> Self {
        match (e.class(), e) {
            (_, SyncError::Auth(message)) => CliError::AuthenticationFailed(message),
            (_, SyncError::InvalidArgument(message)) => CliError::Validation(message),
            (_, SyncError::Remote { code, message }) => CliError::Api { code, message },
            (_, SyncError::DeltaTokenExpired) => CliError::Api {
                code: "DeltaTokenExpired".to_string(),
                message: SyncError::DeltaTokenExpired.to_string(),
            },
            (ErrorClass::TransportOrParse, other) => CliError::Network(other.to_string()),
            (ErrorClass::DataShape, other) => CliError::Shape(other.to_string()),
            (_, other) => CliError::Cache(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Config(format!("JSON error: {}", e))
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        CliError::Credentials(format!("YAML error: {}", e))
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::InputError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain_and_colored() {
        let err = CliError::NotLoggedIn;
        let plain = err.render(false);
        assert!(plain.starts_with("Error: "));
        assert!(plain.contains("\nSuggestion: "));
        assert!(!plain.contains('\x1b'));
        assert!(err.render(true).starts_with("\x1b[31mError:"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::NotLoggedIn.exit_code(), 2);
        assert_eq!(CliError::Network("reset".into()).exit_code(), 3);
        assert_eq!(CliError::Validation("bad".into()).exit_code(), 4);
        assert_eq!(CliError::Cache("disk".into()).exit_code(), 1);
        assert_eq!(CliError::Aborted.exit_code(), 0);
        assert_eq!(
            CliError::Api {
                code: "InternalServerError".into(),
                message: "boom".into()
            }
            .exit_code(),
            5
        );
        assert_eq!(
            CliError::Api {
                code: "AuthorizationFailed".into(),
                message: "no access".into()
            }
            .exit_code(),
            2
        );
    }

    #[test]
    fn test_sync_error_mapping() {
        let cases = [
            (SyncError::Transport("timeout".into()), 3),
            (SyncError::Parse("eof".into()), 3),
            (SyncError::Auth("invalid_client".into()), 2),
            (SyncError::InvalidArgument("type".into()), 4),
            (SyncError::Shape("no value".into()), 5),
            (SyncError::MissingContinuation("users".into()), 5),
            (SyncError::DeltaTokenExpired, 5),
            (
                SyncError::Persist {
                    path: "/tmp/x.json".into(),
                    message: "read-only".into(),
                },
                1,
            ),
        ];
        for (sync_error, code) in cases {
            let text = sync_error.to_string();
            let cli_error = CliError::from(sync_error);
            assert_eq!(cli_error.exit_code(), code, "{text}");
        }
    }

    #[test]
    fn test_remote_error_keeps_code() {
        let err = CliError::from(SyncError::Remote {
            code: "Request_ResourceNotFound".into(),
            message: "gone".into(),
        });
        assert!(err.to_string().contains("Request_ResourceNotFound"));
    }
}
