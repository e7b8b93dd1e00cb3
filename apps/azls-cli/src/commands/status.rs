//! `azls status` - local versus remote object counts

use azls_sync::ObjectType;
use tracing::warn;

use super::{open_inventory, Globals};
use crate::error::CliResult;
use crate::output::print_warning;

/// One row of the status table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub object_type: ObjectType,
    pub local: usize,
    pub remote: Option<usize>,
}

impl StatusRow {
    pub fn render(&self) -> String {
        let remote = self
            .remote
            .map_or_else(|| "error".to_string(), |n| n.to_string());
        format!(
            "{:<4} {:<24} {:>10} {:>10}",
            self.object_type.key(),
            self.object_type.label(),
            self.local,
            remote
        )
    }
}

pub fn header() -> String {
    format!("{:<4} {:<24} {:>10} {:>10}", "KEY", "OBJECTS", "LOCAL", "AZURE")
}

/// Execute the status command
pub async fn execute(globals: &Globals) -> CliResult<()> {
    let inventory = open_inventory(globals)?;

    println!("Tenant: {}", inventory.tenant_id());
    println!("{}", header());
    for object_type in ObjectType::ALL {
        let remote = match inventory.count_remote(object_type).await {
            Ok(n) => Some(n),
            Err(e) => {
                warn!(resource = object_type.resource(), error = %e, "Remote count failed");
                if globals.level.shows_progress() {
                    print_warning(&format!("Cannot count {}: {e}", object_type.resource()));
                }
                None
            }
        };
        let row = StatusRow {
            object_type,
            local: inventory.count_local(object_type),
            remote,
        };
        println!("{}", row.render());
    }
    Ok(())
}
