use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::SessionUser;
use crate::features::hazards::services::HazardSessionService;
use crate::features::map::dtos::{LayerGroupDto, MapConfigDto, VisibilityRequestDto};
use crate::features::map::models::{MapView, MapWidget};
use crate::shared::constants::HAZARDS_GROUP_TITLE;
use crate::shared::types::ApiResponse;

fn view_for(sessions: &HazardSessionService, user: Option<&SessionUser>) -> MapView {
    match user {
        Some(user) => sessions.session_for(user).map_view(),
        None => MapView::new(sessions.catalog().all()),
    }
}

/// Get the map configuration for the caller
///
/// Signed-out callers get the read-only widget set; signed-in callers also
/// get the layer list and, depending on role, the editor and "Add Hazard".
#[utoipa::path(
    get,
    path = "/api/map/config",
    responses(
        (status = 200, description = "Map configuration", body = ApiResponse<MapConfigDto>)
    ),
    tag = "map",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn get_map_config(
    user: Option<SessionUser>,
    State(sessions): State<Arc<HazardSessionService>>,
) -> Result<Json<ApiResponse<MapConfigDto>>> {
    let catalog = sessions.catalog();

    let config = MapConfigDto {
        signed_in: user.is_some(),
        widgets: MapWidget::available_for(user.as_ref()),
        layers: catalog.all().to_vec(),
        hazard_group: LayerGroupDto {
            title: HAZARDS_GROUP_TITLE.to_string(),
            layer_ids: catalog.hazard_layers().iter().map(|l| l.id).collect(),
        },
        view: view_for(&sessions, user.as_ref()),
    };

    Ok(Json(ApiResponse::success(Some(config), None, None)))
}

/// Get the caller's map view
#[utoipa::path(
    get,
    path = "/api/map/view",
    responses(
        (status = 200, description = "Map view", body = ApiResponse<MapView>)
    ),
    tag = "map",
    security(
        (),
        ("bearer_auth" = [])
    )
)]
pub async fn get_map_view(
    user: Option<SessionUser>,
    State(sessions): State<Arc<HazardSessionService>>,
) -> Result<Json<ApiResponse<MapView>>> {
    Ok(Json(ApiResponse::success(
        Some(view_for(&sessions, user.as_ref())),
        None,
        None,
    )))
}

/// Show or hide a layer in the caller's view
#[utoipa::path(
    put,
    path = "/api/map/layers/{id}/visibility",
    params(
        ("id" = i64, Path, description = "Layer ID")
    ),
    request_body = VisibilityRequestDto,
    responses(
        (status = 200, description = "Visibility updated", body = ApiResponse<MapView>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Layer not in view")
    ),
    tag = "map",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_layer_visibility(
    user: SessionUser,
    State(sessions): State<Arc<HazardSessionService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<VisibilityRequestDto>,
) -> Result<Json<ApiResponse<MapView>>> {
    let session = sessions.session_for(&user);
    session.set_layer_visibility(id, dto.visible)?;
    Ok(Json(ApiResponse::success(
        Some(session.map_view()),
        None,
        None,
    )))
}
