//! `azls show` - print cached objects by UUID

use clap::Args;
use uuid::Uuid;

use super::open_store;
use crate::config::ConfigPaths;
use crate::error::{CliError, CliResult};
use crate::output::render_yaml;

/// Arguments for the show command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Object UUID (directory object id, role name, subscription id)
    pub uuid: String,
}

/// Execute the show command
///
/// Looks in the local cache only; list a type first to populate it.
pub async fn execute(args: ShowArgs) -> CliResult<()> {
    let uuid = Uuid::parse_str(args.uuid.trim())
        .map_err(|_| CliError::Validation(format!("'{}' is not a UUID", args.uuid)))?;

    let paths = ConfigPaths::new()?;
    let store = open_store(&paths)?;

    let found = store.find_by_uuid(&uuid.to_string());
    if found.is_empty() {
        return Err(CliError::NotFound(format!(
            "no cached object with id {uuid}; run 'azls list <type>' to refresh the cache"
        )));
    }
    for (object_type, record) in found {
        print!("{}", render_yaml(object_type, &record)?);
    }
    Ok(())
}
