use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI document for the public catalog and the authenticated
/// inventory surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "PharmaFind API",
        description = "Locate medicines across pharmacies and manage per-pharmacy inventory"
    ),
    paths(
        crate::handlers::medicines::list_medicines,
        crate::handlers::medicines::create_medicine,
        crate::handlers::medicines::get_medicine,
        crate::handlers::medicines::pharmacies_carrying_medicine,
        crate::handlers::pharmacies::list_pharmacies,
        crate::handlers::pharmacies::signup,
        crate::handlers::pharmacies::signin,
        crate::handlers::pharmacies::medicines_stocked_by_pharmacy,
        crate::handlers::inventory::add_to_inventory,
        crate::handlers::inventory::create_medicine_in_inventory,
        crate::handlers::inventory::update_inventory_line,
        crate::handlers::inventory::remove_inventory_line,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::entities::Availability,
        crate::entities::StringList,
        crate::services::catalog::CreateMedicineInput,
        crate::services::catalog::UpdateMedicineInput,
        crate::services::pharmacies::SignupInput,
        crate::services::pharmacies::SigninInput,
        crate::services::pharmacies::UpdatePharmacyInput,
        crate::services::pharmacies::AuthenticatedSession,
        crate::services::inventory::AddStockInput,
        crate::services::inventory::CreateMedicineAndStockInput,
        crate::services::inventory::UpdateStockInput,
        crate::services::inventory::PharmacyStockView,
        crate::services::inventory::MedicineStockView,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "medicines", description = "Shared medicine catalog"),
        (name = "pharmacies", description = "Pharmacy accounts and public views"),
        (name = "inventory", description = "Per-pharmacy stock management")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI mounted at /swagger-ui, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_generates_and_covers_core_routes() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_string(&doc).expect("document should serialize");
        assert!(json.contains("/api/v1/medicines"));
        assert!(json.contains("/api/v1/pharmacies/signup"));
        assert!(json.contains("/api/v1/pharmacies/{id}/inventory/create-new"));
    }
}
