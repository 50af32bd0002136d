use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::header,
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
    Json,
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::guards::RequireReporter;
use crate::features::hazards::dtos::HazardSessionDto;
use crate::features::hazards::services::HazardSessionService;
use crate::shared::types::ApiResponse;

/// Get the caller's hazard session
///
/// Wizard, capture and map view state in one document.
#[utoipa::path(
    get,
    path = "/api/hazards/session",
    responses(
        (status = 200, description = "Session retrieved", body = ApiResponse<HazardSessionDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_session(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
) -> Result<Json<ApiResponse<HazardSessionDto>>> {
    let session = service.session_for(&user);
    Ok(Json(ApiResponse::success(
        Some(session.snapshot().await),
        None,
        None,
    )))
}

/// Stream session events
///
/// Each event carries its type as the SSE event name and the JSON payload as data.
#[utoipa::path(
    get,
    path = "/api/hazards/events",
    responses(
        (status = 200, description = "SSE stream of hazard events", content_type = "text/event-stream"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn stream_events(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
) -> Result<Response> {
    let rx = service.session_for(&user).subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|item| match item {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(data) => Some(Ok::<_, Infallible>(
                Event::default().data(data).event(event.name()),
            )),
            Err(e) => {
                tracing::error!("Failed to serialize hazard event: {}", e);
                None
            }
        },
        Err(e) => {
            // Slow consumer; the client re-reads the session snapshot
            tracing::warn!("Hazard event stream lagged: {}", e);
            None
        }
    });

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    );

    Ok(sse.into_response())
}

/// Fetch a media preview
#[utoipa::path(
    get,
    path = "/api/hazards/previews/{id}",
    params(
        ("id" = Uuid, Path, description = "Preview ID")
    ),
    responses(
        (status = 200, description = "Preview bytes with their original content type"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Preview not found or already released")
    ),
    tag = "hazards",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_preview(
    RequireReporter(user): RequireReporter,
    State(service): State<Arc<HazardSessionService>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let preview = service
        .get(&user.id)
        .and_then(|session| session.preview(&id))
        .ok_or_else(|| AppError::NotFound(format!("Preview {} not found", id)))?;

    Ok((
        [
            (header::CONTENT_TYPE, preview.content_type),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        preview.bytes,
    )
        .into_response())
}
