//! Wire types of the ArcGIS REST feature-service API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::features::map::models::{LayerField, LayerSchema, SubcategoryOption};

/// Error envelope. The service answers HTTP 200 with this body on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code)?,
            None => write!(f, "{}", self.message)?,
        }
        if !self.details.is_empty() {
            write!(f, ": {}", self.details.join("; "))?;
        }
        Ok(())
    }
}

/// Either a payload or the service's error envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ServiceResponse<T> {
    Error { error: ServiceError },
    Ok(T),
}

/// `GET {service}?f=json`
#[derive(Debug, Deserialize)]
pub struct ServiceInfo {
    #[serde(default)]
    pub layers: Vec<LayerInfo>,
}

#[derive(Debug, Deserialize)]
pub struct LayerInfo {
    pub id: i64,
    pub name: String,
}

/// `GET {layer}?f=json`
#[derive(Debug, Deserialize)]
pub struct LayerInfoDetail {
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
}

#[derive(Debug, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub domain: Option<DomainInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainInfo {
    #[serde(default)]
    pub coded_values: Option<Vec<CodedValue>>,
}

/// One coded value; codes are numbers or strings depending on the field type
#[derive(Debug, Deserialize)]
pub struct CodedValue {
    pub name: String,
    pub code: Value,
}

impl CodedValue {
    pub fn code_string(&self) -> String {
        match &self.code {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl From<LayerInfoDetail> for LayerSchema {
    fn from(detail: LayerInfoDetail) -> Self {
        let fields = detail
            .fields
            .into_iter()
            .map(|field| LayerField {
                coded_values: field
                    .domain
                    .and_then(|domain| domain.coded_values)
                    .map(|values| {
                        values
                            .iter()
                            .map(|value| SubcategoryOption {
                                name: value.name.clone(),
                                code: value.code_string(),
                            })
                            .collect()
                    }),
                name: field.name,
                alias: field.alias,
                field_type: field.field_type,
            })
            .collect();

        LayerSchema { fields }
    }
}

#[derive(Debug, Serialize)]
pub struct SpatialReference {
    pub wkid: i64,
}

#[derive(Debug, Serialize)]
pub struct PointGeometry {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "spatialReference")]
    pub spatial_reference: SpatialReference,
}

/// One entry of the `features` form field of `addFeatures`
#[derive(Debug, Serialize)]
pub struct NewFeature {
    pub geometry: PointGeometry,
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct EditResult {
    #[serde(rename = "objectId", default)]
    pub object_id: Option<i64>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<ServiceError>,
}

/// `POST {layer}/addFeatures`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFeaturesResponse {
    #[serde(default)]
    pub add_results: Vec<EditResult>,
}

/// `POST {layer}/{objectId}/addAttachment`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAttachmentResponse {
    pub add_attachment_result: EditResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layer_schema_accepts_numeric_and_string_codes() {
        let body = json!({
            "fields": [
                { "name": "OBJECTID", "type": "esriFieldTypeOID" },
                {
                    "name": "Hazard_Subcategory",
                    "alias": "Subcategory",
                    "type": "esriFieldTypeSmallInteger",
                    "domain": {
                        "type": "codedValue",
                        "codedValues": [
                            { "name": "Accident", "code": 1 },
                            { "name": "Road Closure", "code": "2" }
                        ]
                    }
                }
            ]
        });

        let detail: LayerInfoDetail = serde_json::from_value(body).unwrap();
        let schema = LayerSchema::from(detail);

        assert!(schema.field("OBJECTID").unwrap().coded_values.is_none());
        let options = schema
            .field("Hazard_Subcategory")
            .and_then(|f| f.coded_values.clone())
            .unwrap();
        assert_eq!(options[0].code, "1");
        assert_eq!(options[1].code, "2");
        assert_eq!(options[1].name, "Road Closure");
    }

    #[test]
    fn test_error_envelope_detected_on_success_status() {
        let body = json!({
            "error": { "code": 498, "message": "Invalid token.", "details": [] }
        });
        let parsed: ServiceResponse<AddFeaturesResponse> = serde_json::from_value(body).unwrap();
        match parsed {
            ServiceResponse::Error { error } => {
                assert_eq!(error.code, Some(498));
                assert_eq!(error.to_string(), "Invalid token. (code 498)");
            }
            ServiceResponse::Ok(_) => panic!("error envelope parsed as payload"),
        }
    }

    #[test]
    fn test_add_results_parse() {
        let body = json!({
            "addResults": [ { "objectId": 4182, "globalId": null, "success": true } ]
        });
        let parsed: ServiceResponse<AddFeaturesResponse> = serde_json::from_value(body).unwrap();
        let ServiceResponse::Ok(response) = parsed else {
            panic!("payload parsed as error");
        };
        assert_eq!(response.add_results[0].object_id, Some(4182));
        assert!(response.add_results[0].success);
    }

    #[test]
    fn test_feature_serializes_with_spatial_reference() {
        let feature = NewFeature {
            geometry: PointGeometry {
                x: -77.61,
                y: 43.16,
                spatial_reference: SpatialReference { wkid: 4326 },
            },
            attributes: Map::new(),
        };
        let value = serde_json::to_value(&feature).unwrap();
        assert_eq!(value["geometry"]["spatialReference"]["wkid"], 4326);
        assert_eq!(value["geometry"]["x"], -77.61);
    }
}
