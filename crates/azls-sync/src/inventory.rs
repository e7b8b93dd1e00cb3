//! Cache-backed inventory facade used by the CLI.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::client::{get_all, ApiClient};
use crate::config::{CacheConfig, Endpoints};
use crate::error::{SyncError, SyncResult};
use crate::object_type::{
    Api, Freshness, ObjectType, MANAGEMENT_GROUPS_API_VERSION, SUBSCRIPTIONS_API_VERSION,
};
use crate::progress::{NoProgress, Progress};
use crate::record::{Record, RecordSet};
use crate::scope::{scope_list, FetchStrategy, Reconciled, ScopeReconciler};
use crate::store::CacheStore;
use crate::sync::FullSyncDriver;

/// Entry point for listing, counting and clearing cached objects of one tenant.
pub struct Inventory {
    client: Arc<dyn ApiClient>,
    store: CacheStore,
    endpoints: Endpoints,
    cache: CacheConfig,
    strategy: FetchStrategy,
    progress: Arc<dyn Progress>,
}

impl Inventory {
    pub fn new(client: Arc<dyn ApiClient>, store: CacheStore, endpoints: Endpoints) -> Self {
        Self {
            client,
            store,
            endpoints,
            cache: CacheConfig::default(),
            strategy: FetchStrategy::default(),
            progress: Arc::new(NoProgress),
        }
    }

    #[must_use]
    pub fn with_cache_config(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    #[must_use]
    pub fn tenant_id(&self) -> &str {
        self.store.tenant_id()
    }

    /// Current objects of `object_type` whose search attributes contain `filter`.
    ///
    /// Serves the cache while it is fresh unless `force` is set. An empty
    /// filter matches everything.
    #[instrument(skip(self))]
    pub async fn get_current(
        &self,
        object_type: ObjectType,
        filter: &str,
        force: bool,
    ) -> SyncResult<RecordSet> {
        let records = match object_type.freshness() {
            Freshness::AlwaysReconcile => self.reconcile(object_type, true).await?.records,
            Freshness::Hierarchy => self.hierarchy(object_type, force, true).await?,
            Freshness::Directory => {
                match self.usable_cache(object_type, force) {
                    Some(records) => records,
                    None => {
                        let driver = FullSyncDriver::new(
                            self.client.as_ref(),
                            &self.store,
                            &self.endpoints,
                            &self.cache,
                            self.progress.as_ref(),
                        );
                        driver.sync(object_type).await?.records
                    }
                }
            }
        };
        Ok(filter_records(records, object_type, filter))
    }

    /// Reconciles role definitions or assignments across every scope.
    ///
    /// The union is persisted so local counts and lookups see it. Fails only
    /// if the subscription list cannot be loaded or every scope failed.
    pub async fn reconcile(&self, object_type: ObjectType, persist: bool) -> SyncResult<Reconciled> {
        let subscriptions = self
            .hierarchy(ObjectType::Subscription, false, persist)
            .await?;
        let scopes = scope_list(self.tenant_id(), &subscriptions);

        let reconciler = ScopeReconciler::new(
            self.client.as_ref(),
            &self.endpoints,
            self.progress.as_ref(),
            self.strategy,
        );
        let mut reconciled = reconciler.reconcile(object_type, &scopes).await?;

        if !reconciled.any_succeeded(scopes.len()) {
            if let Some(first) = reconciled.failures.drain(..).next() {
                return Err(first.error);
            }
        }
        if !reconciled.failures.is_empty() {
            warn!(
                failed = reconciled.failures.len(),
                scopes = scopes.len(),
                "Reconciliation is partial"
            );
        }
        if persist {
            self.store.save_content(object_type, &reconciled.records)?;
        }
        Ok(reconciled)
    }

    /// Subscriptions or management groups, re-fetched in full when stale.
    async fn hierarchy(
        &self,
        object_type: ObjectType,
        force: bool,
        persist: bool,
    ) -> SyncResult<RecordSet> {
        if persist {
            if let Some(records) = self.usable_cache(object_type, force) {
                return Ok(records);
            }
        }
        let records = self.fetch_hierarchy(object_type).await?;
        if persist {
            self.store.save_content(object_type, &records)?;
        }
        info!(resource = object_type.resource(), count = records.len(), "Fetched");
        Ok(records)
    }

    async fn fetch_hierarchy(&self, object_type: ObjectType) -> SyncResult<RecordSet> {
        let (url, version) = match object_type {
            ObjectType::Subscription => (
                format!("{}/subscriptions", self.endpoints.arm()),
                SUBSCRIPTIONS_API_VERSION,
            ),
            ObjectType::ManagementGroup => (
                format!(
                    "{}/providers/Microsoft.Management/managementGroups",
                    self.endpoints.arm()
                ),
                MANAGEMENT_GROUPS_API_VERSION,
            ),
            other => {
                return Err(SyncError::InvalidArgument(format!(
                    "{} is not a hierarchy type",
                    other.resource()
                )))
            }
        };
        let paged = get_all(self.client.as_ref(), &url, &[], &[("api-version", version)]).await?;
        Ok(paged.records)
    }

    fn usable_cache(&self, object_type: ObjectType, force: bool) -> Option<RecordSet> {
        if force {
            return None;
        }
        let max_age = self.cache.max_age(object_type)?;
        let check = self.store.check(object_type, max_age);
        if check.stale {
            debug!(resource = object_type.resource(), "Cache stale");
            None
        } else {
            Some(check.records)
        }
    }

    /// Deletes the cache artifacts of one type, or of every type when `None`.
    pub fn clear_cache(&self, object_type: Option<ObjectType>) -> SyncResult<usize> {
        match object_type {
            Some(t) => self.store.clear(t),
            None => self.store.clear_all(),
        }
    }

    /// Records currently in the local cache for `object_type`.
    #[must_use]
    pub fn count_local(&self, object_type: ObjectType) -> usize {
        self.store.count_local(object_type)
    }

    /// Objects of `object_type` in the tenant right now, bypassing the cache.
    #[instrument(skip(self))]
    pub async fn count_remote(&self, object_type: ObjectType) -> SyncResult<usize> {
        match (object_type.api(), object_type.freshness()) {
            (Api::Graph, _) => {
                let url = format!(
                    "{}/{}/$count",
                    self.endpoints.graph_v1(),
                    object_type.resource()
                );
                let response = self
                    .client
                    .get(&url, &[("ConsistencyLevel", "eventual")], &[])
                    .await?
                    .into_result()?;
                response
                    .body
                    .get("value")
                    .and_then(serde_json::Value::as_u64)
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| SyncError::Shape("count response has no integer 'value'".into()))
            }
            (Api::Arm, Freshness::AlwaysReconcile) => {
                Ok(self.reconcile(object_type, false).await?.records.len())
            }
            (Api::Arm, _) => Ok(self.hierarchy(object_type, true, false).await?.len()),
        }
    }

    /// Cached objects of any type whose UUID is `uuid`.
    ///
    /// Looks at local cache content only, whatever its age.
    #[must_use]
    pub fn find_by_uuid(&self, uuid: &str) -> Vec<(ObjectType, Record)> {
        self.store.find_by_uuid(uuid)
    }

    /// The management group tree under the tenant root, children expanded.
    pub async fn management_tree(&self) -> SyncResult<Record> {
        let url = format!(
            "{}/providers/Microsoft.Management/managementGroups/{}",
            self.endpoints.arm(),
            self.tenant_id()
        );
        let query = [
            ("api-version", MANAGEMENT_GROUPS_API_VERSION),
            ("$expand", "children"),
            ("$recurse", "true"),
        ];
        let response = self.client.get(&url, &[], &query).await?.into_result()?;
        Record::from_value(response.body)
            .ok_or_else(|| SyncError::Shape("management group tree is not an object".into()))
    }
}

/// Keeps records with `filter` in any of the type's search attributes.
///
/// Matching is a case-insensitive substring test; a record matching on
/// several attributes is returned once.
#[must_use]
pub fn filter_records(records: RecordSet, object_type: ObjectType, filter: &str) -> RecordSet {
    if filter.is_empty() {
        return records;
    }
    let needle = filter.to_lowercase();
    records
        .into_iter()
        .filter(|record| {
            object_type
                .search_paths()
                .iter()
                .any(|path| record.text(path).to_lowercase().contains(&needle))
        })
        .collect()
}
