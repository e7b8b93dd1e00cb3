//! `azls report` - role assignments with names resolved, as CSV

use std::collections::HashMap;
use std::io::Write;

use azls_sync::{Inventory, ObjectType, Record};

use super::{open_inventory, Globals};
use crate::error::{CliError, CliResult};

/// Id to display-name lookups used to resolve an assignment.
#[derive(Debug, Default)]
pub struct NameMaps {
    pub roles: HashMap<String, String>,
    pub subscriptions: HashMap<String, String>,
    pub users: HashMap<String, String>,
    pub groups: HashMap<String, String>,
    pub service_principals: HashMap<String, String>,
}

impl NameMaps {
    /// Builds the maps from current (possibly cached) listings.
    pub async fn load(inventory: &Inventory) -> CliResult<Self> {
        let mut maps = Self::default();
        for (map, object_type, key, value) in [
            (&mut maps.roles, ObjectType::RoleDefinition, "name", "properties.roleName"),
            (&mut maps.subscriptions, ObjectType::Subscription, "subscriptionId", "displayName"),
            (&mut maps.users, ObjectType::User, "id", "displayName"),
            (&mut maps.groups, ObjectType::Group, "id", "displayName"),
            (&mut maps.service_principals, ObjectType::ServicePrincipal, "id", "displayName"),
        ] {
            let records = inventory.get_current(object_type, "", false).await?;
            *map = name_map(&records, key, value);
        }
        Ok(maps)
    }

    fn principal(&self, principal_type: &str, id: &str) -> String {
        let map = match principal_type {
            "User" => &self.users,
            "Group" => &self.groups,
            "ServicePrincipal" => &self.service_principals,
            _ => return String::new(),
        };
        map.get(id).cloned().unwrap_or_default()
    }

    /// Scope with a leading subscription id replaced by its name.
    fn scope(&self, scope: &str) -> String {
        let Some(rest) = scope.strip_prefix("/subscriptions/") else {
            return scope.to_string();
        };
        let (id, path) = rest.split_once('/').unwrap_or((rest, ""));
        let name = self.subscriptions.get(id).map_or("", String::as_str);
        format!("{name} {path}").trim().to_string()
    }
}

fn name_map(records: &[Record], key: &str, value: &str) -> HashMap<String, String> {
    records
        .iter()
        .filter_map(|r| {
            let (k, v) = (r.text(key), r.text(value));
            (!k.is_empty() && !v.is_empty()).then_some((k, v))
        })
        .collect()
}

/// Report columns for one assignment: role, principal, principal type, scope.
pub fn report_row(assignment: &Record, maps: &NameMaps) -> [String; 4] {
    let role_id = assignment.text("properties.roleDefinitionId");
    let role_id = role_id.rsplit('/').next().unwrap_or_default();
    let principal_type = assignment.text("properties.principalType");
    let principal = maps.principal(&principal_type, &assignment.text("properties.principalId"));

    [
        maps.roles.get(role_id).cloned().unwrap_or_default(),
        principal,
        principal_type,
        maps.scope(&assignment.text("properties.scope")),
    ]
}

/// Write the report as CSV with every field quoted.
pub fn write_report<W: Write>(assignments: &[Record], maps: &NameMaps, writer: W) -> CliResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    for assignment in assignments {
        wtr.write_record(report_row(assignment, maps))
            .map_err(|e| CliError::Io(format!("CSV write error: {}", e)))?;
    }

    wtr.flush()
        .map_err(|e| CliError::Io(format!("Failed to flush CSV: {}", e)))?;

    Ok(())
}

/// Execute the report command
pub async fn execute(globals: &Globals) -> CliResult<()> {
    let inventory = open_inventory(globals)?;
    let maps = NameMaps::load(&inventory).await?;
    let assignments = inventory
        .get_current(ObjectType::RoleAssignment, "", false)
        .await?;

    write_report(&assignments, &maps, std::io::stdout().lock())
}
