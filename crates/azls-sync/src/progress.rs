//! Operator-facing progress hooks.
//!
//! Progress is observable output, not part of any data contract: every hook
//! has an empty default so implementations pick what they care about.

use crate::error::SyncError;
use crate::object_type::ObjectType;

/// Receives progress from sync and reconciliation runs.
pub trait Progress: Send + Sync {
    /// A delta page arrived; `records` is the running batch size.
    fn sync_page(&self, _object_type: ObjectType, _records: usize, _calls: usize) {}

    /// One scope of a reconciliation returned `count` records.
    fn scope_fetched(&self, _object_type: ObjectType, _scope: &str, _count: usize, _calls: usize) {}

    /// One scope of a reconciliation failed and was skipped.
    fn scope_failed(&self, _object_type: ObjectType, _scope: &str, _error: &SyncError) {}

    /// The run for `object_type` is over, successfully or not.
    fn finish(&self, _object_type: ObjectType) {}
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}
