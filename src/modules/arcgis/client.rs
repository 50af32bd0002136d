//! ArcGIS feature-service client
//!
//! Reads layer metadata and writes hazard features plus their attachments
//! through the REST API. Implements both seams the features depend on.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use super::types::{
    AddAttachmentResponse, AddFeaturesResponse, EditResult, LayerInfoDetail, NewFeature,
    PointGeometry, ServiceInfo, ServiceResponse, SpatialReference,
};
use crate::core::config::FeatureServiceConfig;
use crate::core::error::{AppError, Result};
use crate::features::hazards::models::{HazardFeature, MediaFile};
use crate::features::hazards::FeatureStore;
use crate::features::map::models::{LayerDescriptor, LayerSchema};
use crate::features::map::LayerSource;
use crate::shared::constants::WGS84_WKID;

pub struct FeatureServiceClient {
    config: FeatureServiceConfig,
    http_client: reqwest::Client,
}

impl FeatureServiceClient {
    pub fn new(config: FeatureServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn layer_endpoint(&self, layer_id: i64) -> String {
        format!("{}/{}", self.config.url, layer_id)
    }

    /// `f=json` plus the token when one is configured
    fn base_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("f", "json".to_string())];
        if let Some(token) = &self.config.token {
            params.push(("token", token.clone()));
        }
        params
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("Feature service GET {}", url);

        let response = self
            .http_client
            .get(url)
            .query(&self.base_params())
            .send()
            .await
            .map_err(|e| {
                error!("Feature service request failed: {:?}", e);
                AppError::ExternalServiceError(format!("Feature service request failed: {}", e))
            })?;

        Self::parse(response).await
    }

    /// Decode a response, treating both HTTP errors and the in-body error envelope as failures
    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Feature service returned {}: {}", status, body);
            return Err(AppError::ExternalServiceError(format!(
                "Feature service returned {}",
                status
            )));
        }

        let parsed: ServiceResponse<T> = response.json().await.map_err(|e| {
            error!("Failed to parse feature service response: {:?}", e);
            AppError::ExternalServiceError(format!(
                "Failed to parse feature service response: {}",
                e
            ))
        })?;

        match parsed {
            ServiceResponse::Ok(body) => Ok(body),
            ServiceResponse::Error { error } => {
                error!("Feature service error: {}", error);
                Err(AppError::ExternalServiceError(error.to_string()))
            }
        }
    }

    fn check_edit(result: Option<EditResult>, action: &str) -> Result<i64> {
        let result = result.ok_or_else(|| {
            AppError::ExternalServiceError(format!("{} returned no result", action))
        })?;

        if !result.success {
            let reason = result
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(AppError::ExternalServiceError(format!(
                "{} failed: {}",
                action, reason
            )));
        }

        result
            .object_id
            .ok_or_else(|| AppError::ExternalServiceError(format!("{} returned no id", action)))
    }
}

#[async_trait]
impl LayerSource for FeatureServiceClient {
    async fn fetch_layers(&self) -> Result<Vec<LayerDescriptor>> {
        let info: ServiceInfo = self.get_json(&self.config.url).await?;

        Ok(info
            .layers
            .into_iter()
            .map(|layer| LayerDescriptor {
                endpoint: self.layer_endpoint(layer.id),
                id: layer.id,
                name: layer.name,
            })
            .collect())
    }

    async fn fetch_layer_schema(&self, layer: &LayerDescriptor) -> Result<LayerSchema> {
        let detail: LayerInfoDetail = self.get_json(&layer.endpoint).await?;
        Ok(detail.into())
    }
}

#[async_trait]
impl FeatureStore for FeatureServiceClient {
    async fn add_feature(&self, layer: &LayerDescriptor, feature: &HazardFeature) -> Result<i64> {
        let features = vec![NewFeature {
            geometry: PointGeometry {
                x: feature.point.longitude,
                y: feature.point.latitude,
                spatial_reference: SpatialReference { wkid: WGS84_WKID },
            },
            attributes: feature.attributes.to_attribute_map(),
        }];
        let features = serde_json::to_string(&features)
            .map_err(|e| AppError::Internal(format!("Failed to encode feature: {}", e)))?;

        let mut params = self.base_params();
        params.push(("features", features));

        let url = format!("{}/addFeatures", layer.endpoint);
        debug!("Adding feature to layer {}", layer.name);

        let response = self
            .http_client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!("addFeatures request failed: {:?}", e);
                AppError::ExternalServiceError(format!("addFeatures request failed: {}", e))
            })?;

        let body: AddFeaturesResponse = Self::parse(response).await?;
        Self::check_edit(body.add_results.into_iter().next(), "addFeatures")
    }

    async fn add_attachment(
        &self,
        layer: &LayerDescriptor,
        object_id: i64,
        file: &MediaFile,
    ) -> Result<i64> {
        let part = Part::stream_with_length(file.bytes.clone(), file.size() as u64)
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| AppError::BadRequest(format!("Invalid content type: {}", e)))?;

        let mut form = Form::new().part("attachment", part);
        for (key, value) in self.base_params() {
            form = form.text(key, value);
        }

        let url = format!("{}/{}/addAttachment", layer.endpoint, object_id);
        debug!(
            "Uploading attachment {} to feature {} on layer {}",
            file.file_name, object_id, layer.name
        );

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("addAttachment request failed: {:?}", e);
                AppError::ExternalServiceError(format!("addAttachment request failed: {}", e))
            })?;

        let body: AddAttachmentResponse = Self::parse(response).await?;
        Self::check_edit(Some(body.add_attachment_result), "addAttachment")
    }
}
