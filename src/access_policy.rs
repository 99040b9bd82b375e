//! Strategies that decide which grants a session receives.
//!
//! The resolver only sees `dyn AccessPolicy`, so replacing the policy does not
//! touch any caller.

use std::collections::HashMap;
use uuid::Uuid;

use crate::permissions::UserPermissionSet;
use crate::session::Session;

pub trait AccessPolicy: Send + Sync {
    /// Grants for an already validated session.
    fn grants_for(&self, session: &Session) -> UserPermissionSet;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Every authenticated user gets every module and permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullAccessPolicy;

impl AccessPolicy for FullAccessPolicy {
    fn grants_for(&self, _session: &Session) -> UserPermissionSet {
        UserPermissionSet::full()
    }

    fn name(&self) -> &'static str {
        "full_access"
    }
}

/// Explicit per-user grants. Unknown users get nothing.
#[derive(Debug, Clone, Default)]
pub struct StaticGrantPolicy {
    grants: HashMap<Uuid, UserPermissionSet>,
}

impl StaticGrantPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: Uuid, grants: UserPermissionSet) -> Self {
        self.grants.insert(user_id, grants);
        self
    }
}

impl AccessPolicy for StaticGrantPolicy {
    fn grants_for(&self, session: &Session) -> UserPermissionSet {
        self.grants
            .get(&session.user_id)
            .cloned()
            .unwrap_or_default()
    }

    fn name(&self) -> &'static str {
        "static_grants"
    }
}
