//! The object types the inventory knows how to cache and list.

use std::fmt;
use std::str::FromStr;

use crate::error::SyncError;
use crate::record::IdField;

/// Subscriptions with this display name are legacy placeholders that fail
/// every ARM query, so they are left out of scope walks and trees.
pub const LEGACY_SUBSCRIPTION_NAME: &str = "Access to Azure Active Directory";

/// `api-version` for ARM role definition and assignment queries.
pub const AUTHORIZATION_API_VERSION: &str = "2022-04-01";

/// `api-version` for ARM subscription listing.
pub const SUBSCRIPTIONS_API_VERSION: &str = "2022-09-01";

/// `api-version` for ARM management group queries.
pub const MANAGEMENT_GROUPS_API_VERSION: &str = "2020-05-01";

/// Backing API of an object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    /// Microsoft Graph (directory objects).
    Graph,
    /// Azure Resource Manager (authorization hierarchy).
    Arm,
}

/// How long a cached list of a type may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// High-churn directory objects, refreshed through a delta link.
    Directory,
    /// Low-churn ARM hierarchy objects, refreshed by a full re-fetch.
    Hierarchy,
    /// Reconciled from the scope hierarchy on every request.
    AlwaysReconcile,
}

/// Kind of object held in one cache artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    RoleDefinition,
    RoleAssignment,
    Subscription,
    ManagementGroup,
    User,
    Group,
    ServicePrincipal,
    Application,
    DirectoryRole,
}

impl ObjectType {
    /// Every type, in listing order.
    pub const ALL: [ObjectType; 9] = [
        ObjectType::RoleDefinition,
        ObjectType::RoleAssignment,
        ObjectType::Subscription,
        ObjectType::ManagementGroup,
        ObjectType::User,
        ObjectType::Group,
        ObjectType::ServicePrincipal,
        ObjectType::Application,
        ObjectType::DirectoryRole,
    ];

    /// Short key used on the command line.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            ObjectType::RoleDefinition => "d",
            ObjectType::RoleAssignment => "a",
            ObjectType::Subscription => "s",
            ObjectType::ManagementGroup => "m",
            ObjectType::User => "u",
            ObjectType::Group => "g",
            ObjectType::ServicePrincipal => "sp",
            ObjectType::Application => "ap",
            ObjectType::DirectoryRole => "ad",
        }
    }

    /// Resource collection name, also used in cache file names.
    #[must_use]
    pub fn resource(&self) -> &'static str {
        match self {
            ObjectType::RoleDefinition => "roleDefinitions",
            ObjectType::RoleAssignment => "roleAssignments",
            ObjectType::Subscription => "subscriptions",
            ObjectType::ManagementGroup => "managementGroups",
            ObjectType::User => "users",
            ObjectType::Group => "groups",
            ObjectType::ServicePrincipal => "servicePrincipals",
            ObjectType::Application => "applications",
            ObjectType::DirectoryRole => "directoryRoles",
        }
    }

    /// Human-readable plural label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ObjectType::RoleDefinition => "RBAC role definitions",
            ObjectType::RoleAssignment => "RBAC role assignments",
            ObjectType::Subscription => "Subscriptions",
            ObjectType::ManagementGroup => "Management groups",
            ObjectType::User => "Users",
            ObjectType::Group => "Groups",
            ObjectType::ServicePrincipal => "Service principals",
            ObjectType::Application => "Applications",
            ObjectType::DirectoryRole => "Directory roles",
        }
    }

    #[must_use]
    pub fn api(&self) -> Api {
        match self {
            ObjectType::RoleDefinition
            | ObjectType::RoleAssignment
            | ObjectType::Subscription
            | ObjectType::ManagementGroup => Api::Arm,
            _ => Api::Graph,
        }
    }

    /// Field merges and de-duplication key on.
    #[must_use]
    pub fn id_field(&self) -> IdField {
        match self {
            ObjectType::RoleDefinition | ObjectType::RoleAssignment => IdField::Name,
            _ => IdField::Id,
        }
    }

    /// Field holding the bare UUID of an object, for lookups by UUID.
    #[must_use]
    pub fn uuid_field(&self) -> &'static str {
        match self {
            ObjectType::RoleDefinition
            | ObjectType::RoleAssignment
            | ObjectType::ManagementGroup => "name",
            ObjectType::Subscription => "subscriptionId",
            _ => "id",
        }
    }

    #[must_use]
    pub fn freshness(&self) -> Freshness {
        match self {
            ObjectType::RoleDefinition | ObjectType::RoleAssignment => Freshness::AlwaysReconcile,
            ObjectType::Subscription | ObjectType::ManagementGroup => Freshness::Hierarchy,
            _ => Freshness::Directory,
        }
    }

    /// Returns true if the backing API offers a delta query for this type.
    #[must_use]
    pub fn supports_delta(&self) -> bool {
        self.api() == Api::Graph
    }

    /// Attributes projected by a full delta query.
    #[must_use]
    pub fn select_fields(&self) -> Option<&'static str> {
        match self {
            ObjectType::User => Some(
                "displayName,mailNickname,userPrincipalName,onPremisesSamAccountName,\
                 onPremisesDomainName,onPremisesUserPrincipalName",
            ),
            ObjectType::Group => {
                Some("displayName,mailNickname,description,isAssignableToRole,mailEnabled")
            }
            ObjectType::ServicePrincipal => Some(
                "displayName,appId,accountEnabled,servicePrincipalType,appOwnerOrganizationId",
            ),
            ObjectType::Application => Some("displayName,appId,requiredResourceAccess"),
            ObjectType::DirectoryRole => Some("displayName,description,roleTemplateId"),
            _ => None,
        }
    }

    /// Dotted attribute paths a filter string is matched against.
    #[must_use]
    pub fn search_paths(&self) -> &'static [&'static str] {
        match self {
            ObjectType::RoleDefinition => &[
                "name",
                "properties.roleName",
                "properties.description",
                "properties.type",
            ],
            ObjectType::RoleAssignment => &[
                "name",
                "properties.roleDefinitionId",
                "properties.principalId",
                "properties.principalType",
                "properties.scope",
            ],
            ObjectType::Subscription => &["subscriptionId", "displayName", "state"],
            ObjectType::ManagementGroup => &["name", "properties.displayName"],
            ObjectType::User => &[
                "id",
                "displayName",
                "userPrincipalName",
                "onPremisesSamAccountName",
                "onPremisesUserPrincipalName",
                "onPremisesDomainName",
            ],
            ObjectType::Group | ObjectType::DirectoryRole => &["id", "displayName", "description"],
            ObjectType::ServicePrincipal | ObjectType::Application => {
                &["id", "displayName", "appId"]
            }
        }
    }

    /// Looks up a type by its command-line key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource())
    }
}

impl FromStr for ObjectType {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
            .or_else(|| Self::ALL.into_iter().find(|t| t.resource().eq_ignore_ascii_case(s)))
            .ok_or_else(|| SyncError::InvalidArgument(format!("Unknown object type '{s}'")))
    }
}
