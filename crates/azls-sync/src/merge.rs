//! Delta merge engine.
//!
//! Folds an incremental result set into a persisted base set: tombstones
//! remove, known identifiers are shallow-merged in place, unknown ones are
//! appended in delta order.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::record::{IdField, Record, RecordSet};

/// Merges `delta` into `base`, keyed by `id_field`.
///
/// - Duplicate content entries in `delta` are dropped (first occurrence wins).
/// - A tombstoned identifier never appears in the output, even if the same
///   batch also carries content for it.
/// - Duplicate identifiers in `base` collapse to their first occurrence.
/// - Base records without an identifier are kept as-is; delta records without
///   one are ignored.
#[must_use]
pub fn merge(base: RecordSet, delta: RecordSet, id_field: IdField) -> RecordSet {
    let mut tombstones: HashSet<String> = HashSet::new();
    let mut updates: Vec<(String, Record)> = Vec::new();
    let mut seen_updates: HashSet<String> = HashSet::new();

    for record in delta {
        let Some(id) = record.identifier(id_field).map(str::to_owned) else {
            debug!("Ignoring delta entry without {}", id_field.as_str());
            continue;
        };
        if record.is_tombstone() {
            tombstones.insert(id);
        } else if seen_updates.insert(id.clone()) {
            updates.push((id, record));
        }
    }

    let mut merged: RecordSet = Vec::with_capacity(base.len() + updates.len());
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(base.len());

    for record in base {
        match record.identifier(id_field) {
            Some(id) if tombstones.contains(id) || positions.contains_key(id) => continue,
            Some(id) => {
                positions.insert(id.to_owned(), merged.len());
                merged.push(record);
            }
            None => merged.push(record),
        }
    }

    for (id, record) in updates {
        if tombstones.contains(&id) {
            continue;
        }
        match positions.get(&id) {
            Some(&index) => merged[index].shallow_merge_from(&record),
            None => {
                positions.insert(id, merged.len());
                merged.push(record);
            }
        }
    }

    merged
}

/// Appends `incoming` to `target`, skipping identifiers already in `seen`.
///
/// Returns how many records were added. Used to union result sets fetched
/// from overlapping scopes, where the first occurrence wins.
pub fn append_unseen(
    target: &mut RecordSet,
    seen: &mut HashSet<String>,
    incoming: RecordSet,
    id_field: IdField,
) -> usize {
    let before = target.len();
    for record in incoming {
        let Some(id) = record.identifier(id_field) else {
            continue;
        };
        if seen.insert(id.to_owned()) {
            target.push(record);
        }
    }
    target.len() - before
}
