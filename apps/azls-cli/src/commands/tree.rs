//! `azls tree` - management group hierarchy

use azls_sync::{Record, LEGACY_SUBSCRIPTION_NAME};
use serde_json::Value;

use super::{open_inventory, Globals};
use crate::error::CliResult;
use crate::output::management_group_kind;

const NAME_WIDTH: usize = 38;
const MIN_NAME_WIDTH: usize = 12;
const INDENT: usize = 4;

/// Execute the tree command
pub async fn execute(globals: &Globals) -> CliResult<()> {
    let inventory = open_inventory(globals)?;
    let tree = inventory.management_tree().await?;
    for line in render_tree(&tree) {
        println!("{line}");
    }
    Ok(())
}

/// Indented lines for the tenant root and everything below it.
pub fn render_tree(root: &Record) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<w$}  {:<w$}  TENANT",
        root.text("properties.displayName"),
        root.text("properties.tenantId"),
        w = NAME_WIDTH
    )];
    if let Some(Value::Array(children)) = root.get_path("properties.children") {
        render_children(children, INDENT, &mut lines);
    }
    lines
}

fn render_children(children: &[Value], indent: usize, lines: &mut Vec<String>) {
    for child in children {
        let text = |key: &str| child.get(key).and_then(Value::as_str).unwrap_or_default();
        let kind = management_group_kind(text("type"));
        if kind == "Subscription" && text("displayName") == LEGACY_SUBSCRIPTION_NAME {
            continue;
        }

        let width = NAME_WIDTH.saturating_sub(indent).max(MIN_NAME_WIDTH);
        lines.push(format!(
            "{:indent$}{:<width$}  {:<id_width$}  {}",
            "",
            text("displayName"),
            text("name"),
            kind,
            id_width = NAME_WIDTH
        ));
        if let Some(Value::Array(grandchildren)) = child.get("children") {
            render_children(grandchildren, indent + INDENT, lines);
        }
    }
}
