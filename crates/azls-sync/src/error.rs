//! Error types for the cache synchronization engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `SyncError`.
pub type SyncResult<T> = Result<T, SyncError>;

/// Broad failure class, used by callers to decide between aborting and
/// skipping a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Network failure, timeout, or an unparseable body.
    TransportOrParse,
    /// The remote answered with an error object instead of data.
    RemoteApi,
    /// The payload did not have the expected shape.
    DataShape,
    /// Local state (cache artifact, token) could not be read or written.
    Local,
}

/// Errors raised by the sync engine and its API collaborator.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Request could not be sent or no response was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body was not valid JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error object embedded in an API response.
    #[error("API error: {code} - {message}")]
    Remote { code: String, message: String },

    /// Expected field absent or of the wrong type.
    #[error("Unexpected response shape: {0}")]
    Shape(String),

    /// Cache artifact could not be written, renamed or removed.
    #[error("Cannot persist {}: {message}", path.display())]
    Persist { path: PathBuf, message: String },

    /// Access token could not be acquired.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A delta page carried neither a next link nor a delta link.
    #[error("Delta query for {0} ended without a continuation link")]
    MissingContinuation(String),

    /// The remote no longer accepts the stored continuation token.
    #[error("Delta token expired, full sync required")]
    DeltaTokenExpired,

    /// Caller supplied an unknown object type or malformed argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl SyncError {
    /// Returns the taxonomy class of this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Transport(_) | Self::Parse(_) => ErrorClass::TransportOrParse,
            Self::Remote { .. } | Self::DeltaTokenExpired => ErrorClass::RemoteApi,
            Self::Shape(_) | Self::MissingContinuation(_) => ErrorClass::DataShape,
            Self::Persist { .. } | Self::Auth(_) | Self::InvalidArgument(_) => ErrorClass::Local,
        }
    }

    /// Returns true if the remote rejected a continuation token and a full
    /// query is required instead.
    #[must_use]
    pub fn requires_resync(&self) -> bool {
        match self {
            Self::DeltaTokenExpired => true,
            Self::Remote { code, .. } => {
                code.contains("resyncRequired")
                    || code.contains("syncStateNotFound")
                    || code == "410"
            }
            _ => false,
        }
    }

    pub(crate) fn persist(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Persist {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SyncError::Transport("Request timed out".to_string())
        } else if e.is_decode() {
            SyncError::Parse(e.to_string())
        } else {
            SyncError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert_eq!(
            SyncError::Transport("x".into()).class(),
            ErrorClass::TransportOrParse
        );
        assert_eq!(SyncError::Parse("x".into()).class(), ErrorClass::TransportOrParse);
        assert_eq!(
            SyncError::Remote {
                code: "Authorization_RequestDenied".into(),
                message: "denied".into()
            }
            .class(),
            ErrorClass::RemoteApi
        );
        assert_eq!(SyncError::Shape("x".into()).class(), ErrorClass::DataShape);
        assert_eq!(
            SyncError::persist("/tmp/x.json", "disk full").class(),
            ErrorClass::Local
        );
    }

    #[test]
    fn test_requires_resync() {
        let err = SyncError::Remote {
            code: "resyncRequired".into(),
            message: "Resync required".into(),
        };
        assert!(err.requires_resync());
        assert!(SyncError::DeltaTokenExpired.requires_resync());
        assert!(!SyncError::Transport("reset".into()).requires_resync());
    }

    #[test]
    fn test_persist_display_includes_path() {
        let err = SyncError::persist("/tmp/cache/t_users.json", "read-only file system");
        let text = err.to_string();
        assert!(text.contains("t_users.json"));
        assert!(text.contains("read-only"));
    }
}
