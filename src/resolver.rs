//! Permission resolution for the current session.
//!
//! `resolve_permissions` is the pure core. `PermissionResolver` adds a
//! per-token cache in front of the external session lookup so route guards
//! can call it on every navigation.
//!
//! A cached entry never outlives the session it was resolved from. Sessions
//! with no known expiry are not kept once their lookup completes.

use chrono::{DateTime, Utc};
use moka::future::Cache;
use moka::Expiry;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::access_policy::{AccessPolicy, FullAccessPolicy};
use crate::errors::AppError;
use crate::permissions::{UserPermissionSet, FALLBACK_ROUTE};
use crate::session::{token_cache_key, Session, SessionLookup};

/// Grants for `session` under `policy`.
///
/// Fails with `Unauthorized` when there is no session or it is no longer
/// valid. Each call builds a new set.
pub fn resolve_permissions(
    session: Option<&Session>,
    policy: &dyn AccessPolicy,
) -> Result<UserPermissionSet, AppError> {
    let session =
        session.ok_or_else(|| AppError::Unauthorized("No active session".to_string()))?;
    if !session.is_valid() {
        return Err(AppError::Unauthorized(
            "Session expired or invalid".to_string(),
        ));
    }
    Ok(policy.grants_for(session))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    Unauthenticated,
    /// The session lookup has not finished yet.
    Pending,
    Resolved(UserPermissionSet),
}

impl ResolutionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ResolutionState::Pending)
    }

    /// Grants to act on right now; nothing unless resolved.
    pub fn permissions(&self) -> UserPermissionSet {
        match self {
            ResolutionState::Resolved(set) => set.clone(),
            _ => UserPermissionSet::empty(),
        }
    }

    pub fn landing_route(&self) -> &'static str {
        match self {
            ResolutionState::Resolved(set) => set.first_accessible_route(),
            _ => FALLBACK_ROUTE,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedGrants {
    grants: UserPermissionSet,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedGrants {
    fn is_live(&self) -> bool {
        self.expires_at.map_or(true, |exp| exp > Utc::now())
    }

    /// Time left before the session expires; zero when unknown or past.
    fn remaining(&self) -> Duration {
        self.expires_at
            .and_then(|exp| (exp - Utc::now()).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }
}

/// Per-entry lifetime: the session's remaining time. The cache TTL still
/// applies on top, so entries live `min(ttl, exp - now)`.
struct SessionExpiry;

impl Expiry<String, CachedGrants> for SessionExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedGrants,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.remaining())
    }
}

/// Resolves permission sets behind a swappable [`AccessPolicy`].
#[derive(Clone)]
pub struct PermissionResolver {
    policy: Arc<dyn AccessPolicy>,
    cache: Cache<String, CachedGrants>,
}

impl PermissionResolver {
    pub fn new(policy: Arc<dyn AccessPolicy>, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .time_to_live(cache_ttl)
            .expire_after(SessionExpiry)
            .max_capacity(10_000)
            .build();
        Self { policy, cache }
    }

    pub fn with_full_access(cache_ttl: Duration) -> Self {
        Self::new(Arc::new(FullAccessPolicy), cache_ttl)
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn resolve(&self, session: Option<&Session>) -> Result<UserPermissionSet, AppError> {
        resolve_permissions(session, self.policy.as_ref())
    }

    /// Maps the identity provider's state onto a resolution state. An
    /// in-flight lookup is `Pending`, an invalid session is `Unauthenticated`.
    pub fn state(&self, lookup: &SessionLookup) -> ResolutionState {
        match lookup {
            SessionLookup::Loading => ResolutionState::Pending,
            SessionLookup::SignedOut => ResolutionState::Unauthenticated,
            SessionLookup::SignedIn(session) => match self.resolve(Some(session)) {
                Ok(set) => ResolutionState::Resolved(set),
                Err(_) => ResolutionState::Unauthenticated,
            },
        }
    }

    /// Resolves the grants for an access token, looking the session up with
    /// `lookup` only when nothing is cached for that token.
    ///
    /// Concurrent calls for the same token share one lookup. If the returned
    /// future is dropped before completion nothing is cached. Errors are
    /// never cached and reach the caller unchanged. Grants stay cached until
    /// the session expires or the TTL passes, whichever comes first.
    pub async fn resolve_token<F, Fut>(
        &self,
        access_token: &str,
        lookup: F,
    ) -> Result<UserPermissionSet, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Session, AppError>>,
    {
        if access_token.trim().is_empty() {
            return Err(AppError::Unauthorized("Missing access token".to_string()));
        }

        let key = token_cache_key(access_token);
        let policy = Arc::clone(&self.policy);
        let cached = self
            .cache
            .try_get_with(key.clone(), async move {
                let session = lookup().await?;
                let grants = resolve_permissions(Some(&session), policy.as_ref())?;
                tracing::debug!(
                    "Resolved {} grants for user {} ({})",
                    grants.len(),
                    session.user_id,
                    policy.name()
                );
                Ok::<_, AppError>(CachedGrants {
                    grants,
                    expires_at: session.expires_at,
                })
            })
            .await
            .map_err(|e| (*e).clone())?;

        if !cached.is_live() {
            self.cache.invalidate(&key).await;
            return Err(AppError::Unauthorized("Session expired".to_string()));
        }

        Ok(cached.grants)
    }

    /// Drops whatever was resolved for `access_token` (logout, token refresh).
    pub async fn invalidate(&self, access_token: &str) {
        self.cache.invalidate(&token_cache_key(access_token)).await;
    }
}
