use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireReporter;
use crate::features::hazards::dtos::{
    DescriptionRequestDto, HazardSessionDto, MediaUploadResponseDto, SelectCategoryRequestDto,
    SelectSubcategoryRequestDto,
};
use crate::features::hazards::models::IncomingFile;
use crate::features::hazards::services::{HazardSession, HazardSessionService};
use crate::shared::types::ApiResponse;

async fn session_response(
    session: &HazardSession,
    message: Option<&str>,
) -> Json<ApiResponse<HazardSessionDto>> {
    Json(ApiResponse::success(
        Some(session.snapshot().await),
        message.map(str::to_string),
        None,
    ))
}

/// Choose the hazard category
///
/// Fetches the category's subcategory list and advances to the subcategory step.
#[utoipa::path(
    post,
    path = "/api/hazards/wizard/category",
    request_body = SelectCategoryRequestDto,
    responses(
        (status = 200, description = "Category selected", body = ApiResponse<HazardSessionDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not a hazard layer"),
        (status = 409, description = "Wizard closed or on another step")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn select_category(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
    AppJson(dto): AppJson<SelectCategoryRequestDto>,
) -> Result<Json<ApiResponse<HazardSessionDto>>> {
    let session = service.session_for(&user);
    session.select_category(dto.layer_id).await?;
    Ok(session_response(&session, None).await)
}

/// Choose the subcategory by its coded value
#[utoipa::path(
    post,
    path = "/api/hazards/wizard/subcategory",
    request_body = SelectSubcategoryRequestDto,
    responses(
        (status = 200, description = "Subcategory selected", body = ApiResponse<HazardSessionDto>),
        (status = 400, description = "Unknown subcategory code"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Wizard closed or on another step")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn select_subcategory(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
    AppJson(dto): AppJson<SelectSubcategoryRequestDto>,
) -> Result<Json<ApiResponse<HazardSessionDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session = service.session_for(&user);
    session.select_subcategory(&dto.code).await?;
    Ok(session_response(&session, None).await)
}

/// Replace the description text
#[utoipa::path(
    put,
    path = "/api/hazards/wizard/description",
    request_body = DescriptionRequestDto,
    responses(
        (status = 200, description = "Description updated", body = ApiResponse<HazardSessionDto>),
        (status = 400, description = "Description too long"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Wizard closed or on another step")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_description(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
    AppJson(dto): AppJson<DescriptionRequestDto>,
) -> Result<Json<ApiResponse<HazardSessionDto>>> {
    let session = service.session_for(&user);
    session.set_description(&dto.description).await?;
    Ok(session_response(&session, None).await)
}

/// Attach images or videos
///
/// Accepts multipart/form-data with any number of `files` parts. Files of
/// 10 MB or more and files that are not images or videos are left out and
/// named in the response message.
#[utoipa::path(
    post,
    path = "/api/hazards/wizard/media",
    request_body(
        content_type = "multipart/form-data",
        description = "One or more `files` parts",
    ),
    responses(
        (status = 200, description = "Selection processed", body = ApiResponse<MediaUploadResponseDto>),
        (status = 400, description = "No files or unreadable multipart body"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Wizard closed or on another step"),
        (status = 413, description = "Request too large")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_media(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<MediaUploadResponseDto>>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != "files" {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unnamed".to_string());

        let bytes = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        files.push(IncomingFile {
            file_name,
            content_type,
            bytes,
        });
    }

    if files.is_empty() {
        return Err(AppError::BadRequest(
            "At least one file is required".to_string(),
        ));
    }

    let session = service.session_for(&user);
    let (outcome, snapshot) = session.add_media(files).await?;

    Ok(Json(ApiResponse::success(
        Some(MediaUploadResponseDto {
            accepted: outcome.accepted,
            rejected: outcome.rejected,
            message: outcome.message.clone(),
            media: snapshot.wizard.media,
        }),
        outcome.message,
        None,
    )))
}

/// Remove an attached file and its preview
#[utoipa::path(
    delete,
    path = "/api/hazards/wizard/media/{index}",
    params(
        ("index" = usize, Path, description = "Position in the attached list")
    ),
    responses(
        (status = 200, description = "File removed", body = ApiResponse<HazardSessionDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No file at that position")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_media(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
    Path(index): Path<usize>,
) -> Result<Json<ApiResponse<HazardSessionDto>>> {
    let session = service.session_for(&user);
    session.remove_media(index).await?;
    Ok(session_response(&session, None).await)
}

/// Dismiss the rejected-files message
#[utoipa::path(
    delete,
    path = "/api/hazards/wizard/media-error",
    responses(
        (status = 200, description = "Message dismissed", body = ApiResponse<HazardSessionDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn dismiss_media_error(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
) -> Result<Json<ApiResponse<HazardSessionDto>>> {
    let session = service.session_for(&user);
    session.dismiss_media_error().await;
    Ok(session_response(&session, None).await)
}

/// Advance from the description or media step
#[utoipa::path(
    post,
    path = "/api/hazards/wizard/next",
    responses(
        (status = 200, description = "Moved forward", body = ApiResponse<HazardSessionDto>),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Selection required or no next step")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn next_step(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
) -> Result<Json<ApiResponse<HazardSessionDto>>> {
    let session = service.session_for(&user);
    session.next().await?;
    Ok(session_response(&session, None).await)
}

#[utoipa::path(
    post,
    path = "/api/hazards/wizard/back",
    responses(
        (status = 200, description = "Moved back", body = ApiResponse<HazardSessionDto>),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "No previous step")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn previous_step(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
) -> Result<Json<ApiResponse<HazardSessionDto>>> {
    let session = service.session_for(&user);
    session.back().await?;
    Ok(session_response(&session, None).await)
}

/// Submit the report
///
/// Returns as soon as the write has started; the wizard shows its
/// confirmation step and the write result arrives on the event stream.
#[utoipa::path(
    post,
    path = "/api/hazards/wizard/submit",
    responses(
        (status = 202, description = "Submission started", body = ApiResponse<HazardSessionDto>),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Not on the review step, no captured point, or a submission is already in progress")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn submit(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
) -> Result<(StatusCode, Json<ApiResponse<HazardSessionDto>>)> {
    let session = service.session_for(&user);
    session.submit(&user).await?;
    Ok((
        StatusCode::ACCEPTED,
        session_response(&session, Some("Thank you for your report!")).await,
    ))
}

/// Close the wizard, discarding the draft and leaving capture mode
#[utoipa::path(
    post,
    path = "/api/hazards/wizard/close",
    responses(
        (status = 200, description = "Wizard closed", body = ApiResponse<HazardSessionDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn close_wizard(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
) -> Result<Json<ApiResponse<HazardSessionDto>>> {
    let session = service.session_for(&user);
    session.close_wizard().await;
    Ok(session_response(&session, None).await)
}
