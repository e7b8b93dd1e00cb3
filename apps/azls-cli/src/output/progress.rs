//! Spinner line on stderr while objects are fetched

use std::sync::Mutex;
use std::time::Duration;

use azls_sync::{ObjectType, Progress, SyncError};
use indicatif::{ProgressBar, ProgressStyle};

use super::printer::print_warning;

/// Shows running counts on one stderr line; failures are printed above it.
#[derive(Default)]
pub struct TerminalProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        let bar = slot.get_or_insert_with(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        });
        f(bar);
    }
}

impl Progress for TerminalProgress {
    fn sync_page(&self, object_type: ObjectType, records: usize, calls: usize) {
        self.with_bar(|bar| {
            bar.set_message(format!(
                "{}: {records} (API calls = {calls})",
                object_type.label()
            ));
        });
    }

    fn scope_fetched(&self, object_type: ObjectType, scope: &str, count: usize, calls: usize) {
        self.with_bar(|bar| {
            bar.set_message(format!(
                "(API calls = {calls}) {count} {} at '{scope}'",
                object_type.resource()
            ));
        });
    }

    fn scope_failed(&self, object_type: ObjectType, scope: &str, error: &SyncError) {
        let message = format!("Skipped {} at '{scope}': {error}", object_type.resource());
        self.with_bar(|bar| bar.suspend(|| print_warning(&message)));
    }

    fn finish(&self, _object_type: ObjectType) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}
