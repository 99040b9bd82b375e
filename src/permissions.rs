//! Module/permission pairs and the queries route guards run against them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::qualification::UnknownVariant;

/// Route used when the user can reach none of the prioritized modules.
pub const FALLBACK_ROUTE: &str = "/";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ModuleName {
    Crm,
    Sales,
    Inventory,
    Finance,
    Marketing,
    Commissions,
    Settings,
    Users,
}

impl ModuleName {
    pub const ALL: [ModuleName; 8] = [
        ModuleName::Crm,
        ModuleName::Sales,
        ModuleName::Inventory,
        ModuleName::Finance,
        ModuleName::Marketing,
        ModuleName::Commissions,
        ModuleName::Settings,
        ModuleName::Users,
    ];

    /// Landing priority. `Users` has no landing page of its own.
    pub const ROUTE_PRIORITY: [ModuleName; 7] = [
        ModuleName::Crm,
        ModuleName::Sales,
        ModuleName::Inventory,
        ModuleName::Finance,
        ModuleName::Marketing,
        ModuleName::Commissions,
        ModuleName::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleName::Crm => "crm",
            ModuleName::Sales => "sales",
            ModuleName::Inventory => "inventory",
            ModuleName::Finance => "finance",
            ModuleName::Marketing => "marketing",
            ModuleName::Commissions => "commissions",
            ModuleName::Settings => "settings",
            ModuleName::Users => "users",
        }
    }

    /// Landing route for modules that appear in [`ModuleName::ROUTE_PRIORITY`].
    pub fn route(self) -> Option<&'static str> {
        match self {
            ModuleName::Crm => Some("/crm"),
            ModuleName::Sales => Some("/sales"),
            ModuleName::Inventory => Some("/inventory"),
            ModuleName::Finance => Some("/finance"),
            ModuleName::Marketing => Some("/marketing"),
            ModuleName::Commissions => Some("/commissions"),
            ModuleName::Settings => Some("/settings"),
            ModuleName::Users => None,
        }
    }
}

impl FromStr for ModuleName {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ModuleName::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or(UnknownVariant(wanted))
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PermissionType {
    View,
    Create,
    Edit,
    Delete,
    Manage,
}

impl PermissionType {
    pub const ALL: [PermissionType; 5] = [
        PermissionType::View,
        PermissionType::Create,
        PermissionType::Edit,
        PermissionType::Delete,
        PermissionType::Manage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionType::View => "view",
            PermissionType::Create => "create",
            PermissionType::Edit => "edit",
            PermissionType::Delete => "delete",
            PermissionType::Manage => "manage",
        }
    }
}

impl FromStr for PermissionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PermissionType::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or(UnknownVariant(wanted))
    }
}

impl fmt::Display for PermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
pub struct ModulePermission {
    pub module: ModuleName,
    pub permission: PermissionType,
}

impl ModulePermission {
    pub fn new(module: ModuleName, permission: PermissionType) -> Self {
        Self { module, permission }
    }
}

/// The permission pairs held by one authenticated user.
///
/// A fresh value is built for every resolution; it is never mutated after
/// being handed out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPermissionSet {
    grants: HashSet<ModulePermission>,
}

impl UserPermissionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every known module crossed with every known permission type.
    pub fn full() -> Self {
        ModuleName::ALL
            .into_iter()
            .flat_map(|module| {
                PermissionType::ALL
                    .into_iter()
                    .map(move |permission| ModulePermission::new(module, permission))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn has_permission(&self, module: ModuleName, permission: PermissionType) -> bool {
        self.grants.contains(&ModulePermission::new(module, permission))
    }

    pub fn has_module_access(&self, module: ModuleName) -> bool {
        PermissionType::ALL
            .into_iter()
            .any(|permission| self.has_permission(module, permission))
    }

    /// Distinct modules with at least one grant, in [`ModuleName::ALL`] order.
    pub fn accessible_modules(&self) -> Vec<ModuleName> {
        ModuleName::ALL
            .into_iter()
            .filter(|m| self.has_module_access(*m))
            .collect()
    }

    /// Route of the first prioritized module the user can access, or
    /// [`FALLBACK_ROUTE`].
    pub fn first_accessible_route(&self) -> &'static str {
        ModuleName::ROUTE_PRIORITY
            .into_iter()
            .filter(|m| self.has_module_access(*m))
            .find_map(ModuleName::route)
            .unwrap_or(FALLBACK_ROUTE)
    }

    /// Grants sorted by module, then permission.
    pub fn to_sorted_vec(&self) -> Vec<ModulePermission> {
        let mut grants: Vec<_> = self.grants.iter().copied().collect();
        grants.sort();
        grants
    }
}

impl FromIterator<ModulePermission> for UserPermissionSet {
    fn from_iter<I: IntoIterator<Item = ModulePermission>>(iter: I) -> Self {
        Self {
            grants: iter.into_iter().collect(),
        }
    }
}

impl Serialize for UserPermissionSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_sorted_vec().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UserPermissionSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Vec::<ModulePermission>::deserialize(deserializer)?
            .into_iter()
            .collect())
    }
}
