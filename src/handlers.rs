use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::auth_client::AuthClient;
use crate::errors::{AppError, ResultExt};
use crate::models::*;
use crate::permissions::{ModuleName, PermissionType, UserPermissionSet, FALLBACK_ROUTE};
use crate::resolver::PermissionResolver;
use crate::scoring::{LeadScore, LeadScorer};
use crate::session::bearer_token;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Lead scorer built from the configured thresholds.
    pub scorer: LeadScorer,
    /// Permission resolver with its per-token cache.
    pub resolver: PermissionResolver,
    /// Session lookup against the backend auth service.
    pub auth_client: AuthClient,
}

impl AppState {
    /// Grants for the bearer token in `headers`.
    async fn permissions_for(&self, headers: &HeaderMap) -> Result<UserPermissionSet, AppError> {
        let token = access_token(headers)?;
        self.resolver
            .resolve_token(token, || self.auth_client.fetch_session(token))
            .await
    }
}

fn access_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "dealer-crm-core",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/v1/leads/score
///
/// Scores a lead from its qualification answers and conversation transcript.
/// Answers that break the data-model invariants are rejected with 400.
#[utoipa::path(
    post,
    path = "/api/v1/leads/score",
    tag = "Leads",
    request_body = ScoreLeadRequest,
    responses(
        (status = 200, description = "Score and classification", body = LeadScore),
        (status = 400, description = "Invalid qualification answers")
    )
)]
pub async fn score_lead(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScoreLeadRequest>,
) -> Result<Json<LeadScore>, AppError> {
    tracing::info!(
        "POST /leads/score - {} transcript line(s)",
        request.transcript.len()
    );

    request.answers.validate().context("invalid qualification answers")?;

    let score = state.scorer.score(&request.answers, &request.transcript);

    tracing::info!(
        "Lead scored: total={} classification={}",
        score.breakdown.total,
        score.classification
    );

    Ok(Json(score))
}

/// GET /api/v1/me/permissions
///
/// Resolves the caller's grants from the bearer token.
#[utoipa::path(
    get,
    path = "/api/v1/me/permissions",
    tag = "Permissions",
    responses(
        (status = 200, description = "Resolved grants", body = PermissionsResponse),
        (status = 401, description = "No valid session"),
        (status = 502, description = "Auth service failure")
    ),
    security(("bearer_token" = []))
)]
pub async fn get_my_permissions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<PermissionsResponse>, AppError> {
    let set = state.permissions_for(&headers).await?;

    Ok(Json(PermissionsResponse::from_set(
        state.resolver.policy_name(),
        &set,
    )))
}

/// GET /api/v1/me/access
///
/// Answers a single access question. Without `permission`, reports whether
/// the caller has any access to `module`.
#[utoipa::path(
    get,
    path = "/api/v1/me/access",
    tag = "Permissions",
    params(AccessQuery),
    responses(
        (status = 200, description = "Access decision", body = AccessResponse),
        (status = 400, description = "Unknown module or permission"),
        (status = 401, description = "No valid session")
    ),
    security(("bearer_token" = []))
)]
pub async fn check_access(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AccessQuery>,
) -> Result<Json<AccessResponse>, AppError> {
    let module: ModuleName = query
        .module
        .parse()
        .map_err(|e| AppError::BadRequest(format!("module: {}", e)))?;
    let permission: Option<PermissionType> = query
        .permission
        .as_deref()
        .map(|p| p.parse::<PermissionType>())
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("permission: {}", e)))?;

    let set = state.permissions_for(&headers).await?;

    let allowed = match permission {
        Some(p) => set.has_permission(module, p),
        None => set.has_module_access(module),
    };
    tracing::debug!(
        "Access check {}:{} -> {}",
        module,
        permission.map_or("*", PermissionType::as_str),
        allowed
    );

    Ok(Json(AccessResponse { allowed }))
}

/// GET /api/v1/me/home-route
///
/// Landing route for the caller. A missing or rejected session gets the
/// fallback route instead of an error; backend failures still surface.
#[utoipa::path(
    get,
    path = "/api/v1/me/home-route",
    tag = "Permissions",
    responses(
        (status = 200, description = "Landing route", body = HomeRouteResponse),
        (status = 502, description = "Auth service failure")
    ),
    security(("bearer_token" = []))
)]
pub async fn get_home_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<HomeRouteResponse>, AppError> {
    let response = match state.permissions_for(&headers).await {
        Ok(set) => HomeRouteResponse {
            route: set.first_accessible_route().to_string(),
            authenticated: true,
        },
        Err(e) if e.is_unauthorized() => HomeRouteResponse {
            route: FALLBACK_ROUTE.to_string(),
            authenticated: false,
        },
        Err(e) => return Err(e),
    };

    Ok(Json(response))
}

/// POST /api/v1/me/logout
///
/// Forgets the permission set cached for the caller's token.
#[utoipa::path(
    post,
    path = "/api/v1/me/logout",
    tag = "Permissions",
    responses(
        (status = 204, description = "Cached grants dropped"),
        (status = 401, description = "Missing bearer token")
    ),
    security(("bearer_token" = []))
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = access_token(&headers)?;
    state.resolver.invalidate(token).await;
    tracing::info!("Cached permissions dropped on logout");
    Ok(StatusCode::NO_CONTENT)
}
