//! One-line and YAML renderings of cached records

use azls_sync::{ObjectType, Record};

use crate::error::CliResult;

/// Short kind name for a management group tree node's `type`.
pub fn management_group_kind(resource_type: &str) -> &'static str {
    match resource_type {
        "Microsoft.Management/managementGroups" => "ManagementGroup",
        "Microsoft.Management/managementGroups/subscriptions" | "/subscriptions" => "Subscription",
        _ => "??",
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Minimal columns identifying one record of `object_type`.
pub fn terse_line(object_type: ObjectType, record: &Record) -> String {
    let line = match object_type {
        ObjectType::RoleDefinition => format!(
            "{}  {:<60}  {}",
            record.text("name"),
            record.text("properties.roleName"),
            record.text("properties.type")
        ),
        ObjectType::RoleAssignment => format!(
            "{}  {}  {} {:<20} {}",
            record.text("name"),
            last_segment(&record.text("properties.roleDefinitionId")),
            record.text("properties.principalId"),
            format!("({})", record.text("properties.principalType")),
            record.text("properties.scope")
        ),
        ObjectType::Subscription => format!(
            "{}  {:<10}  {}",
            record.text("subscriptionId"),
            record.text("state"),
            record.text("displayName")
        ),
        ObjectType::ManagementGroup => format!(
            "{:<38}  {:<20}  {}",
            record.text("name"),
            record.text("properties.displayName"),
            management_group_kind(&record.text("type"))
        ),
        ObjectType::User => format!(
            "{}  {:<50} {:<18} {}",
            record.text("id"),
            record.text("userPrincipalName"),
            record.text("onPremisesSamAccountName"),
            record.text("displayName")
        ),
        ObjectType::Group => format!("{}  {}", record.text("id"), record.text("displayName")),
        ObjectType::ServicePrincipal => format!(
            "{}  {:<60} {:<22} {}",
            record.text("id"),
            record.text("displayName"),
            record.text("servicePrincipalType"),
            record.text("appId")
        ),
        ObjectType::Application => format!(
            "{}  {:<60} {}",
            record.text("id"),
            record.text("displayName"),
            record.text("appId")
        ),
        ObjectType::DirectoryRole => format!(
            "{}  {:<60} {}",
            record.text("id"),
            record.text("displayName"),
            record.text("description")
        ),
    };
    line.trim_end().to_string()
}

/// YAML document for one record, headed by a comment naming its type.
pub fn render_yaml(object_type: ObjectType, record: &Record) -> CliResult<String> {
    let body = serde_yaml::to_string(record)?;
    Ok(format!("# {}\n{}", object_type.label(), body))
}
