//! Scope-hierarchy reconciliation for role definitions and assignments.
//!
//! ARM cannot list "everything at or below a scope" reliably, so the full set
//! is assembled by querying the tenant root management group and then every
//! subscription, keeping the first occurrence of each identifier. Scopes
//! below subscriptions (resource groups, resources) are not visited.

use std::collections::HashSet;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, instrument, warn};

use crate::client::{get_all, ApiClient, Paged};
use crate::config::Endpoints;
use crate::error::{SyncError, SyncResult};
use crate::merge::append_unseen;
use crate::object_type::{ObjectType, AUTHORIZATION_API_VERSION, LEGACY_SUBSCRIPTION_NAME};
use crate::progress::Progress;
use crate::record::{Record, RecordSet};

/// Only custom definitions are defined below the tenant root.
const CUSTOM_ROLE_FILTER: &str = "type eq 'CustomRole'";

/// An authorization scope to query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// ARM path, e.g. `/subscriptions/{id}`.
    pub path: String,
    /// Display name for progress output.
    pub label: String,
    /// True for the tenant root management group.
    pub is_root: bool,
}

impl Scope {
    #[must_use]
    pub fn tenant_root(tenant_id: &str) -> Self {
        Self {
            path: format!("/providers/Microsoft.Management/managementGroups/{tenant_id}"),
            label: "Tenant Root Group".to_string(),
            is_root: true,
        }
    }

    #[must_use]
    pub fn subscription(subscription_id: &str, name: &str) -> Self {
        Self {
            path: format!("/subscriptions/{subscription_id}"),
            label: if name.is_empty() {
                subscription_id.to_string()
            } else {
                name.to_string()
            },
            is_root: false,
        }
    }
}

/// Ordered scope list: tenant root first, then each usable subscription.
#[must_use]
pub fn scope_list(tenant_id: &str, subscriptions: &[Record]) -> Vec<Scope> {
    let mut scopes = vec![Scope::tenant_root(tenant_id)];
    for sub in subscriptions {
        let id = sub.text("subscriptionId");
        let name = sub.text("displayName");
        if id.is_empty() || name == LEGACY_SUBSCRIPTION_NAME {
            continue;
        }
        scopes.push(Scope::subscription(&id, &name));
    }
    scopes
}

/// How scope queries are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// One scope at a time, in list order.
    #[default]
    Sequential,
    /// Up to `n` scopes in flight; results are still folded in list order.
    Concurrent(usize),
}

impl FetchStrategy {
    #[must_use]
    pub fn from_concurrency(n: usize) -> Self {
        if n <= 1 {
            FetchStrategy::Sequential
        } else {
            FetchStrategy::Concurrent(n)
        }
    }

    fn width(self) -> usize {
        match self {
            FetchStrategy::Sequential => 1,
            FetchStrategy::Concurrent(n) => n.max(1),
        }
    }
}

/// A scope whose query failed and was skipped.
#[derive(Debug)]
pub struct ScopeFailure {
    pub scope: Scope,
    pub error: SyncError,
}

/// Union of all scope results.
#[derive(Debug, Default)]
pub struct Reconciled {
    /// De-duplicated records, in first-seen order.
    pub records: RecordSet,
    pub failures: Vec<ScopeFailure>,
    pub calls: usize,
}

impl Reconciled {
    /// True if at least one scope answered.
    #[must_use]
    pub fn any_succeeded(&self, scope_count: usize) -> bool {
        self.failures.len() < scope_count
    }
}

/// Walks the scope hierarchy for role definitions or assignments.
pub struct ScopeReconciler<'a> {
    client: &'a dyn ApiClient,
    endpoints: &'a Endpoints,
    progress: &'a dyn Progress,
    strategy: FetchStrategy,
}

impl<'a> ScopeReconciler<'a> {
    pub fn new(
        client: &'a dyn ApiClient,
        endpoints: &'a Endpoints,
        progress: &'a dyn Progress,
        strategy: FetchStrategy,
    ) -> Self {
        Self {
            client,
            endpoints,
            progress,
            strategy,
        }
    }

    /// Queries every scope and folds the results, lowest hierarchy level first.
    ///
    /// A failed scope is reported and skipped; the rest are still folded.
    #[instrument(skip(self, scopes), fields(resource = object_type.resource(), scopes = scopes.len()))]
    pub async fn reconcile(
        &self,
        object_type: ObjectType,
        scopes: &[Scope],
    ) -> SyncResult<Reconciled> {
        if !matches!(
            object_type,
            ObjectType::RoleDefinition | ObjectType::RoleAssignment
        ) {
            return Err(SyncError::InvalidArgument(format!(
                "{} is not reconciled across scopes",
                object_type.resource()
            )));
        }

        let id_field = object_type.id_field();
        let mut reconciled = Reconciled::default();
        let mut seen: HashSet<String> = HashSet::new();

        // `buffered` yields in input order, so the fold order is the scope order
        // regardless of how many requests are in flight.
        let mut results = stream::iter(scopes)
            .map(|scope| async move { (scope, self.fetch_scope(object_type, scope).await) })
            .buffered(self.strategy.width());

        while let Some((scope, result)) = results.next().await {
            match result {
                Ok(paged) => {
                    reconciled.calls += paged.calls;
                    let count = paged.records.len();
                    let added =
                        append_unseen(&mut reconciled.records, &mut seen, paged.records, id_field);
                    debug!(scope = %scope.path, count, added, "Scope fetched");
                    self.progress
                        .scope_fetched(object_type, &scope.label, count, reconciled.calls);
                }
                Err(error) => {
                    reconciled.calls += 1;
                    warn!(scope = %scope.path, "Skipping scope: {error}");
                    self.progress
                        .scope_failed(object_type, &scope.label, &error);
                    reconciled.failures.push(ScopeFailure {
                        scope: scope.clone(),
                        error,
                    });
                }
            }
        }
        self.progress.finish(object_type);

        Ok(reconciled)
    }

    async fn fetch_scope(&self, object_type: ObjectType, scope: &Scope) -> SyncResult<Paged> {
        let url = format!(
            "{}{}/providers/Microsoft.Authorization/{}",
            self.endpoints.arm(),
            scope.path,
            object_type.resource()
        );
        let mut query = vec![("api-version", AUTHORIZATION_API_VERSION)];
        if object_type == ObjectType::RoleDefinition && !scope.is_root {
            query.push(("$filter", CUSTOM_ROLE_FILTER));
        }
        get_all(self.client, &url, &[], &query).await
    }
}
