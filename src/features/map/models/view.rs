use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::layer::LayerDescriptor;
use super::point::MapPoint;
use crate::core::error::AppError;
use crate::shared::constants::{
    DEFAULT_BASEMAP, DEFAULT_CENTER_LATITUDE, DEFAULT_CENTER_LONGITUDE, DEFAULT_ZOOM,
    HAZARD_LAYER_TITLES,
};

/// Render state of one layer in a user's view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LayerViewState {
    pub layer_id: i64,
    pub visible: bool,
    /// Bumped every time the layer's rendered features must be reloaded
    pub revision: u64,
}

/// Per-user map view: centre, zoom, basemap and layer state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MapView {
    pub center: MapPoint,
    pub zoom: u8,
    pub basemap: String,
    /// Keyed by layer id
    pub layers: BTreeMap<i64, LayerViewState>,
}

impl MapView {
    /// Hazard layers start visible; every other layer starts hidden
    pub fn new(layers: &[LayerDescriptor]) -> Self {
        let layers = layers
            .iter()
            .map(|layer| {
                let visible = HAZARD_LAYER_TITLES.contains(&layer.name.as_str());
                (
                    layer.id,
                    LayerViewState {
                        layer_id: layer.id,
                        visible,
                        revision: 0,
                    },
                )
            })
            .collect();

        Self {
            center: MapPoint::new(DEFAULT_CENTER_LONGITUDE, DEFAULT_CENTER_LATITUDE),
            zoom: DEFAULT_ZOOM,
            basemap: DEFAULT_BASEMAP.to_string(),
            layers,
        }
    }

    pub fn set_layer_visibility(&mut self, layer_id: i64, visible: bool) -> Result<(), AppError> {
        let state = self
            .layers
            .get_mut(&layer_id)
            .ok_or_else(|| AppError::NotFound(format!("Layer {} not found", layer_id)))?;
        state.visible = visible;
        Ok(())
    }

    /// Returns the new revision
    pub fn refresh_layer(&mut self, layer_id: i64) -> Result<u64, AppError> {
        let state = self
            .layers
            .get_mut(&layer_id)
            .ok_or_else(|| AppError::NotFound(format!("Layer {} not found", layer_id)))?;
        state.revision += 1;
        Ok(state.revision)
    }

    pub fn go_to(&mut self, point: MapPoint) {
        self.center = point;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layers() -> Vec<LayerDescriptor> {
        vec![
            LayerDescriptor {
                id: 0,
                name: "Sidewalks".to_string(),
                endpoint: "https://example.test/FeatureServer/0".to_string(),
            },
            LayerDescriptor {
                id: 2,
                name: "Traffic".to_string(),
                endpoint: "https://example.test/FeatureServer/2".to_string(),
            },
        ]
    }

    #[test]
    fn test_default_view() {
        let view = MapView::new(&layers());
        assert_eq!(view.zoom, 14);
        assert_eq!(view.basemap, "streets-navigation-vector");
        assert_eq!(view.center, MapPoint::new(-77.6109, 43.1566));
        assert!(!view.layers[&0].visible);
        assert!(view.layers[&2].visible);
    }

    #[test]
    fn test_visibility_and_refresh() {
        let mut view = MapView::new(&layers());
        view.set_layer_visibility(2, false).unwrap();
        assert!(!view.layers[&2].visible);

        assert_eq!(view.refresh_layer(2).unwrap(), 1);
        assert_eq!(view.refresh_layer(2).unwrap(), 2);

        assert!(matches!(
            view.set_layer_visibility(9, true),
            Err(AppError::NotFound(_))
        ));
    }
}
