//! Log level selection and tracing setup
//!
//! Flags choose a default filter; `RUST_LOG` overrides it. Logs go to
//! stderr so listings on stdout stay pipeable.

use std::fmt;

use tracing_subscriber::EnvFilter;

/// Verbosity level for CLI output
///
/// Levels are ordered: Quiet < Normal < Verbose < Debug
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Results and errors only
    Quiet = 0,
    /// Results, progress and warnings (default)
    #[default]
    Normal = 1,
    /// Info logs from the sync engine
    Verbose = 2,
    /// Every API call and cache decision
    Debug = 3,
}

impl LogLevel {
    /// Create LogLevel from CLI flags
    ///
    /// Order of precedence: debug > verbose > quiet > normal
    pub fn from_flags(verbose: bool, debug: bool, quiet: bool) -> Self {
        if debug {
            Self::Debug
        } else if verbose {
            Self::Verbose
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    pub fn shows_progress(&self) -> bool {
        *self >= Self::Normal
    }

    /// Default filter directive when `RUST_LOG` is unset
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "warn,azls_sync=info,azls_cli=info",
            Self::Debug => "info,azls_sync=debug,azls_cli=debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Quiet => "QUIET",
            Self::Normal => "NORMAL",
            Self::Verbose => "VERBOSE",
            Self::Debug => "DEBUG",
        };
        f.write_str(name)
    }
}

/// Install the global stderr subscriber
pub fn init(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::env::var("NO_COLOR").is_err())
        .with_target(level >= LogLevel::Debug)
        .try_init();
}
