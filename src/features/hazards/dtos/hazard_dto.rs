use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::hazards::models::{MediaSummary, WizardStep};
use crate::features::hazards::services::MouseButton;
use crate::features::map::models::{LayerDescriptor, MapPoint, MapView, SubcategoryOption};

/// Wizard state as the renderer needs it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WizardSnapshotDto {
    pub open: bool,
    pub step: WizardStep,
    pub step_index: usize,
    pub step_label: String,
    pub title: String,
    pub category: Option<LayerDescriptor>,
    pub subcategory_options: Vec<SubcategoryOption>,
    /// Selected subcategory with its display name
    pub subcategory: Option<SubcategoryOption>,
    pub description: String,
    pub remaining_description_chars: usize,
    pub occurred_at: DateTime<Utc>,
    pub media: Vec<MediaSummary>,
    pub media_error: Option<String>,
    pub can_go_back: bool,
    pub can_go_next: bool,
    pub can_submit: bool,
}

/// Point-capture state
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CaptureSnapshotDto {
    pub armed: bool,
    pub point: Option<MapPoint>,
    pub submission_in_flight: bool,
}

/// Everything a renderer needs to redraw a signed-in user's screen
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HazardSessionDto {
    pub wizard: WizardSnapshotDto,
    pub capture: CaptureSnapshotDto,
    pub view: MapView,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MapClickRequestDto {
    pub button: MouseButton,
    #[validate(nested)]
    pub point: MapPoint,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MapClickResponseDto {
    /// `captured`, `disarmed` or `ignored`
    pub outcome: String,
    pub wizard_open: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectCategoryRequestDto {
    pub layer_id: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SelectSubcategoryRequestDto {
    #[validate(length(min = 1, message = "Subcategory code is required"))]
    pub code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DescriptionRequestDto {
    pub description: String,
}

/// Result of one media selection
#[derive(Debug, Serialize, ToSchema)]
pub struct MediaUploadResponseDto {
    pub accepted: usize,
    pub rejected: Vec<String>,
    pub message: Option<String>,
    pub media: Vec<MediaSummary>,
}
