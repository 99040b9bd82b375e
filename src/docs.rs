use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::{engagement, models, permissions, qualification, scoring};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::score_lead,
        handlers::get_my_permissions,
        handlers::check_access,
        handlers::get_home_route,
        handlers::logout,
    ),
    components(
        schemas(
            // --- Leads ---
            qualification::QualificationAnswers,
            qualification::PaymentMethod,
            qualification::PurchaseTimeline,
            qualification::VehicleUsage,
            engagement::EngagementSignal,
            scoring::Classification,
            scoring::ScoreBreakdown,
            scoring::LeadScore,
            models::ScoreLeadRequest,

            // --- Permissions ---
            permissions::ModuleName,
            permissions::PermissionType,
            permissions::ModulePermission,
            models::PermissionsResponse,
            models::AccessResponse,
            models::HomeRouteResponse,
        )
    ),
    tags(
        (name = "Leads", description = "Lead qualification scoring"),
        (name = "Permissions", description = "Module access for the current session")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_token",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
