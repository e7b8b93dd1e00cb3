//! Engine settings: API endpoints, staleness windows and fetch tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::object_type::{Freshness, ObjectType};

/// Default staleness window for directory objects (1 day).
pub const DEFAULT_DIRECTORY_MAX_AGE_SECS: u64 = 86_400;

/// Default staleness window for ARM hierarchy objects (1 week).
pub const DEFAULT_HIERARCHY_MAX_AGE_SECS: u64 = 7 * 86_400;

/// Default maximum age of a stored delta link (27 days, under Graph's 30).
pub const DEFAULT_DELTA_LINK_MAX_AGE_SECS: u64 = 27 * 86_400;

/// Staleness windows per freshness class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Window for users, groups, service principals, applications, roles
    pub directory_max_age_secs: u64,
    /// Window for subscriptions and management groups
    pub hierarchy_max_age_secs: u64,
    /// Age after which a stored delta link is discarded
    pub delta_link_max_age_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory_max_age_secs: DEFAULT_DIRECTORY_MAX_AGE_SECS,
            hierarchy_max_age_secs: DEFAULT_HIERARCHY_MAX_AGE_SECS,
            delta_link_max_age_secs: DEFAULT_DELTA_LINK_MAX_AGE_SECS,
        }
    }
}

impl CacheConfig {
    /// Staleness window for `object_type`; `None` means always reconciled.
    #[must_use]
    pub fn max_age(&self, object_type: ObjectType) -> Option<Duration> {
        match object_type.freshness() {
            Freshness::Directory => Some(Duration::from_secs(self.directory_max_age_secs)),
            Freshness::Hierarchy => Some(Duration::from_secs(self.hierarchy_max_age_secs)),
            Freshness::AlwaysReconcile => None,
        }
    }

    #[must_use]
    pub fn delta_link_max_age(&self) -> Duration {
        Duration::from_secs(self.delta_link_max_age_secs)
    }
}

/// Base URLs of the three services the tool talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub graph_url: String,
    pub arm_url: String,
    pub login_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            graph_url: "https://graph.microsoft.com".to_string(),
            arm_url: "https://management.azure.com".to_string(),
            login_url: "https://login.microsoftonline.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Graph v1.0 base, without trailing slash.
    #[must_use]
    pub fn graph_v1(&self) -> String {
        format!("{}/v1.0", self.graph_url.trim_end_matches('/'))
    }

    #[must_use]
    pub fn arm(&self) -> &str {
        self.arm_url.trim_end_matches('/')
    }
}
