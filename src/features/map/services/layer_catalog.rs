use async_trait::async_trait;
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::map::models::{LayerDescriptor, LayerSchema, SubcategoryOption};
use crate::shared::constants::HAZARD_SUBCATEGORY_FIELD;

/// Remote source of layer metadata
#[async_trait]
pub trait LayerSource: Send + Sync {
    /// All layers of the feature service
    async fn fetch_layers(&self) -> Result<Vec<LayerDescriptor>>;

    /// Field schema (with coded-value domains) of one layer
    async fn fetch_layer_schema(&self, layer: &LayerDescriptor) -> Result<LayerSchema>;
}

/// Layers of the feature service, loaded once at startup and read-only afterwards
pub struct LayerCatalog {
    layers: Vec<LayerDescriptor>,
    hazard_layer_ids: Vec<i64>,
    source: Arc<dyn LayerSource>,
}

impl LayerCatalog {
    /// Load the catalog. A failed fetch yields an empty catalog.
    pub async fn load(source: Arc<dyn LayerSource>, hazard_layer_ids: Vec<i64>) -> Self {
        let layers = match source.fetch_layers().await {
            Ok(layers) => {
                tracing::info!("Layer catalog loaded with {} layers", layers.len());
                layers
            }
            Err(e) => {
                tracing::error!("Failed to load layer catalog, continuing without layers: {}", e);
                Vec::new()
            }
        };

        Self {
            layers,
            hazard_layer_ids,
            source,
        }
    }

    pub fn all(&self) -> &[LayerDescriptor] {
        &self.layers
    }

    /// Layers offered as hazard categories, in catalog order
    pub fn hazard_layers(&self) -> Vec<&LayerDescriptor> {
        self.layers
            .iter()
            .filter(|layer| self.hazard_layer_ids.contains(&layer.id))
            .collect()
    }

    pub fn find_hazard_layer(&self, id: i64) -> Option<&LayerDescriptor> {
        self.hazard_layers().into_iter().find(|layer| layer.id == id)
    }

    pub fn find_by_id(&self, id: i64) -> Option<&LayerDescriptor> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Exact, case-sensitive name match
    pub fn find_by_name(&self, name: &str) -> Option<&LayerDescriptor> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    pub async fn schema(&self, layer: &LayerDescriptor) -> Result<LayerSchema> {
        self.source.fetch_layer_schema(layer).await
    }

    /// Subcategory vocabulary of a hazard layer.
    ///
    /// Read from the coded-value domain of the `Hazard_Subcategory` field.
    /// Any failure degrades to an empty list.
    pub async fn subcategories(&self, layer: &LayerDescriptor) -> Vec<SubcategoryOption> {
        let schema = match self.source.fetch_layer_schema(layer).await {
            Ok(schema) => schema,
            Err(e) => {
                tracing::warn!("Failed to fetch schema for layer {}: {}", layer.name, e);
                return Vec::new();
            }
        };

        match schema
            .field(HAZARD_SUBCATEGORY_FIELD)
            .and_then(|field| field.coded_values.clone())
        {
            Some(options) => options,
            None => {
                tracing::warn!(
                    "Layer {} has no {} domain",
                    layer.name,
                    HAZARD_SUBCATEGORY_FIELD
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory layer source shared by tests across features

    use super::*;
    use crate::core::error::AppError;
    use crate::features::map::models::LayerField;
    use std::collections::HashMap;

    pub fn hazard_layer(id: i64, name: &str) -> LayerDescriptor {
        LayerDescriptor {
            id,
            name: name.to_string(),
            endpoint: format!("https://features.test/FeatureServer/{}", id),
        }
    }

    pub fn sample_layers() -> Vec<LayerDescriptor> {
        vec![
            hazard_layer(0, "Sidewalks"),
            hazard_layer(1, "Severe Weather"),
            hazard_layer(2, "Traffic"),
            hazard_layer(3, "Buildings"),
            hazard_layer(4, "Public Safety"),
            hazard_layer(5, "Utility Problems"),
        ]
    }

    pub fn subcategory_schema(options: &[(&str, &str)]) -> LayerSchema {
        LayerSchema {
            fields: vec![
                LayerField {
                    name: "OBJECTID".to_string(),
                    alias: None,
                    field_type: Some("esriFieldTypeOID".to_string()),
                    coded_values: None,
                },
                LayerField {
                    name: HAZARD_SUBCATEGORY_FIELD.to_string(),
                    alias: Some("Subcategory".to_string()),
                    field_type: Some("esriFieldTypeString".to_string()),
                    coded_values: Some(
                        options
                            .iter()
                            .map(|(name, code)| SubcategoryOption {
                                name: name.to_string(),
                                code: code.to_string(),
                            })
                            .collect(),
                    ),
                },
            ],
        }
    }

    /// Serves fixed layers; schemas are looked up by layer id
    #[derive(Default)]
    pub struct StaticLayerSource {
        pub layers: Option<Vec<LayerDescriptor>>,
        pub schemas: HashMap<i64, LayerSchema>,
    }

    impl StaticLayerSource {
        pub fn with_hazard_layers() -> Self {
            let mut schemas = HashMap::new();
            schemas.insert(
                2,
                subcategory_schema(&[("Accident", "1"), ("Road Closure", "2"), ("Debris", "3")]),
            );
            schemas.insert(1, subcategory_schema(&[("Flooding", "1"), ("Ice", "2")]));
            Self {
                layers: Some(sample_layers()),
                schemas,
            }
        }
    }

    #[async_trait]
    impl LayerSource for StaticLayerSource {
        async fn fetch_layers(&self) -> Result<Vec<LayerDescriptor>> {
            self.layers
                .clone()
                .ok_or_else(|| AppError::ExternalServiceError("feature service down".to_string()))
        }

        async fn fetch_layer_schema(&self, layer: &LayerDescriptor) -> Result<LayerSchema> {
            self.schemas.get(&layer.id).cloned().ok_or_else(|| {
                AppError::ExternalServiceError(format!("no schema for {}", layer.id))
            })
        }
    }

    pub async fn sample_catalog() -> Arc<LayerCatalog> {
        Arc::new(
            LayerCatalog::load(
                Arc::new(StaticLayerSource::with_hazard_layers()),
                vec![1, 2, 3, 4, 5],
            )
            .await,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[tokio::test]
    async fn test_hazard_layers_follow_allow_list() {
        let catalog = sample_catalog().await;
        let names: Vec<&str> = catalog
            .hazard_layers()
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "Severe Weather",
                "Traffic",
                "Buildings",
                "Public Safety",
                "Utility Problems"
            ]
        );
        assert!(catalog.find_hazard_layer(0).is_none());
        assert!(catalog.find_by_id(0).is_some());
    }

    #[tokio::test]
    async fn test_find_by_name_is_exact() {
        let catalog = sample_catalog().await;
        assert_eq!(catalog.find_by_name("Traffic").map(|l| l.id), Some(2));
        assert!(catalog.find_by_name("traffic").is_none());
    }

    #[tokio::test]
    async fn test_subcategories_from_coded_domain() {
        let catalog = sample_catalog().await;
        let traffic = catalog.find_by_name("Traffic").unwrap().clone();
        let options = catalog.subcategories(&traffic).await;
        assert_eq!(options.len(), 3);
        assert_eq!(options[1].name, "Road Closure");
        assert_eq!(options[1].code, "2");
    }

    #[tokio::test]
    async fn test_subcategories_degrade_to_empty() {
        let catalog = sample_catalog().await;
        let buildings = catalog.find_by_name("Buildings").unwrap().clone();
        assert!(catalog.subcategories(&buildings).await.is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_yields_empty_catalog() {
        let catalog = LayerCatalog::load(Arc::new(StaticLayerSource::default()), vec![1, 2]).await;
        assert!(catalog.all().is_empty());
        assert!(catalog.hazard_layers().is_empty());
    }
}
