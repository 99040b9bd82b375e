//! HTTP routing for the service.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::handlers::{self, AppState};

/// Rate-limited API routes, without state. The binary layers security
/// middleware on top of these.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Lead qualification
        .route("/api/v1/leads/score", post(handlers::score_lead))
        // Session permissions
        .route("/api/v1/me/permissions", get(handlers::get_my_permissions))
        .route("/api/v1/me/access", get(handlers::check_access))
        .route("/api/v1/me/home-route", get(handlers::get_home_route))
        .route("/api/v1/me/logout", post(handlers::logout))
        // API Documentation
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Full router with health check and state attached.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(api_routes())
        .with_state(state)
}
