use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::map::models::{LayerDescriptor, MapView, MapWidget};

#[derive(Debug, Serialize, ToSchema)]
pub struct LayersResponseDto {
    pub layers: Vec<LayerDescriptor>,
    /// Layers offered as hazard categories, in catalog order
    pub hazard_layers: Vec<LayerDescriptor>,
}

/// Layer group shown in the layer list
#[derive(Debug, Serialize, ToSchema)]
pub struct LayerGroupDto {
    pub title: String,
    pub layer_ids: Vec<i64>,
}

/// What the renderer should build for the caller
#[derive(Debug, Serialize, ToSchema)]
pub struct MapConfigDto {
    pub signed_in: bool,
    pub widgets: Vec<MapWidget>,
    pub layers: Vec<LayerDescriptor>,
    pub hazard_group: LayerGroupDto,
    pub view: MapView,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VisibilityRequestDto {
    pub visible: bool,
}
