//! Local cache synchronization for Azure directory and RBAC inventories.
//!
//! This crate keeps per-tenant JSON caches of Microsoft Graph directory
//! objects and Azure Resource Manager authorization objects up to date.
//!
//! # Features
//!
//! - Staleness checks per object type
//! - Delta merge with tombstones and shallow updates
//! - Graph delta-query sync with all-or-nothing persistence
//! - Scope-hierarchy reconciliation for role definitions and assignments
//! - `OAuth2` client credentials authentication
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use azls_sync::{
//!     CacheStore, ClientCredentialTokens, ClientCredentials, ClientSettings, HttpApiClient,
//!     Inventory, ObjectType,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = ClientSettings::default();
//! let http = HttpApiClient::build_http(settings.timeout)?;
//! let credentials = ClientCredentials {
//!     tenant_id: "tenant-id".to_string(),
//!     client_id: "client-id".to_string(),
//!     client_secret: "client-secret".to_string().into(),
//! };
//! let tokens = ClientCredentialTokens::new(http.clone(), credentials, &settings.endpoints);
//! let endpoints = settings.endpoints.clone();
//! let client = HttpApiClient::new(http, Arc::new(tokens), settings);
//!
//! let inventory = Inventory::new(
//!     Arc::new(client),
//!     CacheStore::new("/tmp/azls", "tenant-id"),
//!     endpoints,
//! );
//! let users = inventory.get_current(ObjectType::User, "alice", false).await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod error;
mod inventory;
mod merge;
mod object_type;
mod progress;
mod record;
mod scope;
mod staleness;
mod store;
mod sync;

// Re-exports
pub use auth::{ClientCredentialTokens, ClientCredentials, StaticToken, TokenCache, TokenProvider};
pub use client::{
    get_all, ApiClient, ApiErrorBody, ApiResponse, ClientSettings, Continuation, HttpApiClient,
    Paged,
};
pub use config::{
    CacheConfig, Endpoints, DEFAULT_DELTA_LINK_MAX_AGE_SECS, DEFAULT_DIRECTORY_MAX_AGE_SECS,
    DEFAULT_HIERARCHY_MAX_AGE_SECS,
};
pub use error::{ErrorClass, SyncError, SyncResult};
pub use inventory::{filter_records, Inventory};
pub use merge::{append_unseen, merge};
pub use object_type::{
    Api, Freshness, ObjectType, AUTHORIZATION_API_VERSION, LEGACY_SUBSCRIPTION_NAME,
    MANAGEMENT_GROUPS_API_VERSION, SUBSCRIPTIONS_API_VERSION,
};
pub use progress::{NoProgress, Progress};
pub use record::{
    records_from_value, IdField, Record, RecordSet, MEMBERS_DELTA_MARKER, REMOVED_FIELD,
    REMOVED_MARKER,
};
pub use scope::{scope_list, FetchStrategy, Reconciled, Scope, ScopeFailure, ScopeReconciler};
pub use staleness::{check_local_cache, check_local_cache_at, CacheCheck};
pub use store::{CacheStore, StoredDeltaLink};
pub use sync::{FullSyncDriver, SyncOutcome};
