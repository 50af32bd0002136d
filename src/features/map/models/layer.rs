use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One remote feature layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LayerDescriptor {
    pub id: i64,
    pub name: String,
    /// Layer URL (`{FeatureServer}/{id}`)
    pub endpoint: String,
}

/// A coded-value pair from a layer's subcategory domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubcategoryOption {
    pub name: String,
    pub code: String,
}

/// Field of a layer schema, with its coded-value domain when it has one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LayerField {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coded_values: Option<Vec<SubcategoryOption>>,
}

/// Schema of a single layer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct LayerSchema {
    pub fields: Vec<LayerField>,
}

impl LayerSchema {
    pub fn field(&self, name: &str) -> Option<&LayerField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
