use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{self, dtos as auth_dtos, model as auth_model};
use crate::features::hazards::{
    dtos as hazards_dtos, events as hazards_events, handlers as hazards_handlers,
    models as hazards_models, services as hazards_services,
};
use crate::features::map::{dtos as map_dtos, handlers as map_handlers, models as map_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::refresh_token,
        auth::handlers::get_me,
        auth::handlers::logout,
        // Map
        map_handlers::list_layers,
        map_handlers::list_subcategories,
        map_handlers::get_layer_schema,
        map_handlers::get_map_config,
        map_handlers::get_map_view,
        map_handlers::set_layer_visibility,
        // Hazards
        hazards_handlers::get_session,
        hazards_handlers::stream_events,
        hazards_handlers::get_preview,
        hazards_handlers::arm_capture,
        hazards_handlers::disarm_capture,
        hazards_handlers::map_click,
        hazards_handlers::select_category,
        hazards_handlers::select_subcategory,
        hazards_handlers::set_description,
        hazards_handlers::add_media,
        hazards_handlers::remove_media,
        hazards_handlers::dismiss_media_error,
        hazards_handlers::next_step,
        hazards_handlers::previous_step,
        hazards_handlers::submit,
        hazards_handlers::close_wizard,
    ),
    components(
        schemas(
            Meta,
            // Auth
            auth_dtos::RegisterRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::RefreshTokenRequestDto,
            auth_dtos::AuthResponseDto,
            auth_model::SessionUser,
            auth_model::Role,
            ApiResponse<auth_dtos::AuthResponseDto>,
            ApiResponse<auth_model::SessionUser>,
            // Map
            map_models::LayerDescriptor,
            map_models::SubcategoryOption,
            map_models::LayerField,
            map_models::LayerSchema,
            map_models::MapPoint,
            map_models::MapView,
            map_models::LayerViewState,
            map_models::MapWidget,
            map_dtos::LayersResponseDto,
            map_dtos::LayerGroupDto,
            map_dtos::MapConfigDto,
            map_dtos::VisibilityRequestDto,
            ApiResponse<map_dtos::LayersResponseDto>,
            ApiResponse<Vec<map_models::SubcategoryOption>>,
            ApiResponse<map_models::LayerSchema>,
            ApiResponse<map_dtos::MapConfigDto>,
            ApiResponse<map_models::MapView>,
            // Hazards
            hazards_models::WizardStep,
            hazards_models::MediaSummary,
            hazards_events::HazardEvent,
            hazards_services::MouseButton,
            hazards_dtos::WizardSnapshotDto,
            hazards_dtos::CaptureSnapshotDto,
            hazards_dtos::HazardSessionDto,
            hazards_dtos::MapClickRequestDto,
            hazards_dtos::MapClickResponseDto,
            hazards_dtos::SelectCategoryRequestDto,
            hazards_dtos::SelectSubcategoryRequestDto,
            hazards_dtos::DescriptionRequestDto,
            hazards_dtos::MediaUploadResponseDto,
            ApiResponse<hazards_dtos::HazardSessionDto>,
            ApiResponse<hazards_dtos::CaptureSnapshotDto>,
            ApiResponse<hazards_dtos::MapClickResponseDto>,
            ApiResponse<hazards_dtos::MediaUploadResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Registration, sign-in and session endpoints"),
        (name = "map", description = "Feature-service layers and per-user map view"),
        (name = "hazards", description = "Hazard capture, submission wizard and event stream"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "SafeSigns API",
        version = "0.1.0",
        description = "API documentation for SafeSigns hazard reporting",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
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

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_feature() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/auth/login"));
        assert!(paths.contains_key("/api/layers/{id}/subcategories"));
        assert!(paths.contains_key("/api/hazards/wizard/submit"));
        assert!(paths.contains_key("/api/hazards/events"));

        let schemes = doc.components.as_ref().map(|c| &c.security_schemes);
        assert!(schemes.is_some_and(|s| s.contains_key("bearer_auth")));
    }
}
