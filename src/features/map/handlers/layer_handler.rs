use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::{AppError, Result};
use crate::features::auth::guards::RequireEditor;
use crate::features::map::dtos::LayersResponseDto;
use crate::features::map::models::{LayerSchema, SubcategoryOption};
use crate::features::map::services::LayerCatalog;
use crate::shared::types::{ApiResponse, Meta};

/// List the feature-service layers
#[utoipa::path(
    get,
    path = "/api/layers",
    responses(
        (status = 200, description = "Layers retrieved", body = ApiResponse<LayersResponseDto>)
    ),
    tag = "map"
)]
pub async fn list_layers(
    State(catalog): State<Arc<LayerCatalog>>,
) -> Result<Json<ApiResponse<LayersResponseDto>>> {
    let layers = catalog.all().to_vec();
    let total = layers.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(LayersResponseDto {
            layers,
            hazard_layers: catalog.hazard_layers().into_iter().cloned().collect(),
        }),
        None,
        Some(Meta { total }),
    )))
}

/// List a hazard layer's subcategories
///
/// Read from the layer's subcategory coded-value domain. An empty list means
/// the schema could not be read.
#[utoipa::path(
    get,
    path = "/api/layers/{id}/subcategories",
    params(
        ("id" = i64, Path, description = "Layer ID")
    ),
    responses(
        (status = 200, description = "Subcategories retrieved", body = ApiResponse<Vec<SubcategoryOption>>),
        (status = 404, description = "Not a hazard layer")
    ),
    tag = "map"
)]
pub async fn list_subcategories(
    State(catalog): State<Arc<LayerCatalog>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<SubcategoryOption>>>> {
    let layer = catalog
        .find_hazard_layer(id)
        .ok_or_else(|| AppError::NotFound(format!("Hazard layer {} not found", id)))?;

    let options = catalog.subcategories(layer).await;
    let total = options.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(options),
        None,
        Some(Meta { total }),
    )))
}

/// Get a layer's field schema for the feature editor
#[utoipa::path(
    get,
    path = "/api/layers/{id}/schema",
    params(
        ("id" = i64, Path, description = "Layer ID")
    ),
    responses(
        (status = 200, description = "Schema retrieved", body = ApiResponse<LayerSchema>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Editor access required"),
        (status = 404, description = "Layer not found"),
        (status = 502, description = "Feature service error")
    ),
    tag = "map",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_layer_schema(
    RequireEditor(_user): RequireEditor,
    State(catalog): State<Arc<LayerCatalog>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<LayerSchema>>> {
    let layer = catalog
        .find_by_id(id)
        .ok_or_else(|| AppError::NotFound(format!("Layer {} not found", id)))?;

    let schema = catalog.schema(layer).await?;
    Ok(Json(ApiResponse::success(Some(schema), None, None)))
}
