//! `azls list` - list objects of one type

use azls_sync::{ObjectType, RecordSet};
use clap::Args;

use super::{open_inventory, parse_object_type, Globals};
use crate::error::CliResult;
use crate::output::terse_line;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Object type: d, a, s, m, u, g, sp, ap, ad (or the resource name)
    #[arg(value_parser = parse_object_type)]
    pub object_type: ObjectType,

    /// Only objects with this text in a searchable attribute
    #[arg(default_value = "")]
    pub filter: String,

    /// Output the matching objects as a JSON array
    #[arg(long)]
    pub json: bool,

    /// Ignore the local cache and query the API
    #[arg(short, long)]
    pub refresh: bool,
}

/// Execute the list command
pub async fn execute(args: ListArgs, globals: &Globals) -> CliResult<()> {
    let inventory = open_inventory(globals)?;
    let records = inventory
        .get_current(args.object_type, &args.filter, args.refresh)
        .await?;

    for line in render(args.object_type, &records, args.json)? {
        println!("{line}");
    }
    Ok(())
}

/// Output lines for a listing, terse or JSON.
pub fn render(object_type: ObjectType, records: &RecordSet, json: bool) -> CliResult<Vec<String>> {
    if json {
        return Ok(vec![serde_json::to_string_pretty(records)?]);
    }
    Ok(records
        .iter()
        .map(|record| terse_line(object_type, record))
        .collect())
}
