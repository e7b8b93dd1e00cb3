//! Full-sync driver for delta-capable Graph object types.

use tracing::{debug, info, instrument, warn};

use crate::client::{ApiClient, Continuation};
use crate::config::{CacheConfig, Endpoints};
use crate::error::{SyncError, SyncResult};
use crate::merge::merge;
use crate::object_type::ObjectType;
use crate::progress::Progress;
use crate::record::RecordSet;
use crate::store::CacheStore;

/// Asks Graph to return only the projected (or changed) attributes.
const PREFER_MINIMAL: (&str, &str) = ("Prefer", "return=minimal");

/// What one sync did.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// The merged set, as persisted.
    pub records: RecordSet,
    /// True if the round started from the base listing instead of a delta link.
    pub full: bool,
    /// Number of API calls made.
    pub calls: usize,
    /// Entries in the accumulated delta batch.
    pub delta_size: usize,
}

/// One accumulated delta round.
struct DeltaBatch {
    records: RecordSet,
    delta_link: String,
    calls: usize,
}

/// Pages through a delta query, merges once, persists all-or-nothing.
pub struct FullSyncDriver<'a> {
    client: &'a dyn ApiClient,
    store: &'a CacheStore,
    endpoints: &'a Endpoints,
    cache: &'a CacheConfig,
    progress: &'a dyn Progress,
}

impl<'a> FullSyncDriver<'a> {
    pub fn new(
        client: &'a dyn ApiClient,
        store: &'a CacheStore,
        endpoints: &'a Endpoints,
        cache: &'a CacheConfig,
        progress: &'a dyn Progress,
    ) -> Self {
        Self {
            client,
            store,
            endpoints,
            cache,
            progress,
        }
    }

    /// Brings the cache artifact of `object_type` up to date.
    ///
    /// Resumes from the stored delta link when it is younger than the
    /// configured maximum and the cached content is non-empty; otherwise
    /// lists the type from scratch. A rejected delta link falls back to one
    /// full query. Nothing is written unless every page was fetched.
    #[instrument(skip(self), fields(resource = object_type.resource()))]
    pub async fn sync(&self, object_type: ObjectType) -> SyncResult<SyncOutcome> {
        if !object_type.supports_delta() {
            return Err(SyncError::InvalidArgument(format!(
                "{} has no delta query",
                object_type.resource()
            )));
        }

        let base = self.store.load_content(object_type);
        let resume_from = match self.store.load_delta_link(object_type) {
            Some(stored) if stored.age >= self.cache.delta_link_max_age() => {
                debug!(age_secs = stored.age.as_secs(), "Delta link too old, discarding");
                None
            }
            Some(_) if base.is_empty() => None,
            Some(stored) => Some(stored.link),
            None => None,
        };

        let result = match resume_from {
            Some(link) => match self.fetch(object_type, &link, &[]).await {
                Ok(batch) => Ok((batch, base, false)),
                Err(e) if e.requires_resync() => {
                    warn!("Delta link rejected ({e}), running a full sync");
                    self.fetch_full(object_type).await.map(|b| (b, RecordSet::new(), true))
                }
                Err(e) => Err(e),
            },
            None => self
                .fetch_full(object_type)
                .await
                .map(|b| (b, RecordSet::new(), true)),
        };
        self.progress.finish(object_type);
        let (batch, base, full) = result?;

        let delta_size = batch.records.len();
        let records = merge(base, batch.records, object_type.id_field());
        self.store
            .commit(object_type, &records, Some(&batch.delta_link))?;

        info!(
            full,
            delta_size,
            total = records.len(),
            calls = batch.calls,
            "Sync completed"
        );
        Ok(SyncOutcome {
            records,
            full,
            calls: batch.calls,
            delta_size,
        })
    }

    async fn fetch_full(&self, object_type: ObjectType) -> SyncResult<DeltaBatch> {
        let url = format!(
            "{}/{}/delta",
            self.endpoints.graph_v1(),
            object_type.resource()
        );
        let select = object_type.select_fields().unwrap_or_default();
        self.fetch(object_type, &url, &[("$select", select)]).await
    }

    /// Accumulates every page of one delta round.
    async fn fetch(
        &self,
        object_type: ObjectType,
        url: &str,
        query: &[(&str, &str)],
    ) -> SyncResult<DeltaBatch> {
        let headers = [PREFER_MINIMAL];
        let mut records = RecordSet::new();
        let mut calls = 0;
        let mut response = self.client.get(url, &headers, query).await?;

        loop {
            calls += 1;
            let page = response.into_result()?;
            match page.records() {
                Ok(batch) => records.extend(batch),
                Err(SyncError::Shape(msg)) => warn!("{msg}, treating page as empty"),
                Err(e) => return Err(e),
            }
            self.progress.sync_page(object_type, records.len(), calls);

            match page.continuation {
                Continuation::Next(next) => {
                    response = self.client.get(&next, &headers, &[]).await?;
                }
                Continuation::Delta(delta_link) => {
                    return Ok(DeltaBatch {
                        records,
                        delta_link,
                        calls,
                    });
                }
                Continuation::End => {
                    return Err(SyncError::MissingContinuation(
                        object_type.resource().to_string(),
                    ));
                }
            }
        }
    }
}
