use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireReporter;
use crate::features::hazards::dtos::{CaptureSnapshotDto, MapClickRequestDto, MapClickResponseDto};
use crate::features::hazards::services::{ClickOutcome, HazardSessionService};
use crate::shared::types::ApiResponse;

/// Enter point-capture mode ("Add Hazard")
#[utoipa::path(
    post,
    path = "/api/hazards/capture/arm",
    responses(
        (status = 200, description = "Capture armed", body = ApiResponse<CaptureSnapshotDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn arm_capture(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
) -> Result<Json<ApiResponse<CaptureSnapshotDto>>> {
    let session = service.session_for(&user);
    session.arm_capture();
    Ok(Json(ApiResponse::success(
        Some(session.snapshot().await.capture),
        Some("Click on the map to place the hazard".to_string()),
        None,
    )))
}

/// Leave point-capture mode
#[utoipa::path(
    post,
    path = "/api/hazards/capture/disarm",
    responses(
        (status = 200, description = "Capture disarmed", body = ApiResponse<CaptureSnapshotDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn disarm_capture(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
) -> Result<Json<ApiResponse<CaptureSnapshotDto>>> {
    let session = service.session_for(&user);
    session.disarm_capture();
    Ok(Json(ApiResponse::success(
        Some(session.snapshot().await.capture),
        None,
        None,
    )))
}

/// Deliver a map click
///
/// A primary click while armed stores the point and opens the wizard. A
/// secondary click while armed cancels capture. Anything else is ignored.
#[utoipa::path(
    post,
    path = "/api/hazards/map-clicks",
    request_body = MapClickRequestDto,
    responses(
        (status = 200, description = "Click handled", body = ApiResponse<MapClickResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn map_click(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
    AppJson(dto): AppJson<MapClickRequestDto>,
) -> Result<Json<ApiResponse<MapClickResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = service.session_for(&user);
    let outcome = session.map_click(dto.button, dto.point).await;

    let outcome = match outcome {
        ClickOutcome::Captured(_) => "captured",
        ClickOutcome::Disarmed => "disarmed",
        ClickOutcome::Ignored => "ignored",
    };
    let wizard_open = session.snapshot().await.wizard.open;

    Ok(Json(ApiResponse::success(
        Some(MapClickResponseDto {
            outcome: outcome.to_string(),
            wizard_open,
        }),
        None,
        None,
    )))
}
