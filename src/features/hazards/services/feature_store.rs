use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::hazards::models::{HazardFeature, MediaFile};
use crate::features::map::models::LayerDescriptor;

/// Remote write side of a feature layer
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Add one feature; returns the new object id
    async fn add_feature(&self, layer: &LayerDescriptor, feature: &HazardFeature) -> Result<i64>;

    /// Attach a file to an existing feature; returns the attachment id
    async fn add_attachment(
        &self,
        layer: &LayerDescriptor,
        object_id: i64,
        file: &MediaFile,
    ) -> Result<i64>;
}
