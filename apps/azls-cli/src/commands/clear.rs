//! `azls clear` - delete cache files

use std::io::IsTerminal;

use azls_sync::ObjectType;
use clap::Args;
use dialoguer::Confirm;

use super::{open_store, parse_object_type};
use crate::config::ConfigPaths;
use crate::error::{CliError, CliResult};
use crate::output::{print_info, print_success};

/// Arguments for the clear command
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Object type to clear, or "all"
    pub target: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// What a clear request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    All,
    One(ObjectType),
}

impl ClearTarget {
    pub fn parse(target: &str) -> CliResult<Self> {
        if target.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        parse_object_type(target)
            .map(Self::One)
            .map_err(CliError::Validation)
    }

    fn describe(&self) -> String {
        match self {
            Self::All => "all cached objects".to_string(),
            Self::One(t) => format!("cached {}", t.label().to_lowercase()),
        }
    }
}

/// Execute the clear command
pub async fn execute(args: ClearArgs) -> CliResult<()> {
    let target = ClearTarget::parse(&args.target)?;

    if !args.yes {
        if !std::io::stdin().is_terminal() {
            return Err(CliError::Validation(
                "Cannot confirm in non-interactive mode. Use --yes to skip confirmation."
                    .to_string(),
            ));
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {}?", target.describe()))
            .default(false)
            .interact()?;
        if !confirmed {
            return Err(CliError::Aborted);
        }
    }

    let paths = ConfigPaths::new()?;
    let store = open_store(&paths)?;
    let removed = match target {
        ClearTarget::All => store.clear_all()?,
        ClearTarget::One(t) => store.clear(t)?,
    };

    if removed == 0 {
        print_info("Nothing to clear.");
    } else {
        print_success(&format!("Removed {removed} cache file(s)."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(ClearTarget::parse("ALL").unwrap(), ClearTarget::All);
        assert_eq!(
            ClearTarget::parse("ap").unwrap(),
            ClearTarget::One(ObjectType::Application)
        );
        assert!(matches!(
            ClearTarget::parse("everything"),
            Err(CliError::Validation(_))
        ));
    }
}
