use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::permissions::{ModuleName, ModulePermission, UserPermissionSet};
use crate::qualification::QualificationAnswers;

// ============ Request Models ============

/// Body of `POST /api/v1/leads/score`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreLeadRequest {
    pub answers: QualificationAnswers,
    /// Conversation lines, oldest first.
    #[schema(example = json!(["Olá, vi o anúncio", "quero falar com vendedor"]))]
    pub transcript: Vec<String>,
}

/// Query of `GET /api/v1/me/access`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccessQuery {
    /// Module name, e.g. `crm`.
    pub module: String,
    /// Permission type; omit to ask for any access to the module.
    pub permission: Option<String>,
}

// ============ Response Models ============

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsResponse {
    pub policy: String,
    pub permissions: Vec<ModulePermission>,
    pub modules: Vec<ModuleName>,
    #[schema(example = "/crm")]
    pub home_route: String,
}

impl PermissionsResponse {
    pub fn from_set(policy: &str, set: &UserPermissionSet) -> Self {
        Self {
            policy: policy.to_string(),
            permissions: set.to_sorted_vec(),
            modules: set.accessible_modules(),
            home_route: set.first_accessible_route().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccessResponse {
    pub allowed: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomeRouteResponse {
    #[schema(example = "/crm")]
    pub route: String,
    /// False when the route is the fallback for an unauthenticated caller.
    pub authenticated: bool,
}
