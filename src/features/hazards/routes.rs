use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::features::hazards::handlers;
use crate::features::hazards::services::HazardSessionService;

/// Hazard reporting routes (require a signed-in user)
///
/// `max_media_batch_size` caps one media upload request, multipart overhead included.
pub fn routes(service: Arc<HazardSessionService>, max_media_batch_size: usize) -> Router {
    Router::new()
        .route("/api/hazards/session", get(handlers::get_session))
        .route("/api/hazards/events", get(handlers::stream_events))
        .route("/api/hazards/previews/{id}", get(handlers::get_preview))
        .route("/api/hazards/capture/arm", post(handlers::arm_capture))
        .route("/api/hazards/capture/disarm", post(handlers::disarm_capture))
        .route("/api/hazards/map-clicks", post(handlers::map_click))
        .route("/api/hazards/wizard/category", post(handlers::select_category))
        .route(
            "/api/hazards/wizard/subcategory",
            post(handlers::select_subcategory),
        )
        .route(
            "/api/hazards/wizard/description",
            put(handlers::set_description),
        )
        .route(
            "/api/hazards/wizard/media",
            post(handlers::add_media).layer(DefaultBodyLimit::max(max_media_batch_size)),
        )
        .route(
            "/api/hazards/wizard/media/{index}",
            delete(handlers::remove_media),
        )
        .route(
            "/api/hazards/wizard/media-error",
            delete(handlers::dismiss_media_error),
        )
        .route("/api/hazards/wizard/next", post(handlers::next_step))
        .route("/api/hazards/wizard/back", post(handlers::previous_step))
        .route("/api/hazards/wizard/submit", post(handlers::submit))
        .route("/api/hazards/wizard/close", post(handlers::close_wizard))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::hazards::events::HazardEvent;
    use crate::features::hazards::services::orchestrator::{lock, testing::RecordingFeatureStore};
    use crate::features::map::services::layer_catalog::testing::sample_catalog;
    use crate::shared::test_helpers::{create_reporter_user, with_session_user};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::time::Duration;

    const MB: usize = 1024 * 1024;

    async fn setup() -> (
        TestServer,
        Arc<HazardSessionService>,
        Arc<RecordingFeatureStore>,
        crate::features::auth::model::SessionUser,
    ) {
        let store = Arc::new(RecordingFeatureStore::default());
        let service = Arc::new(HazardSessionService::new(
            sample_catalog().await,
            store.clone(),
        ));
        let user = create_reporter_user();
        let app = with_session_user(routes(service.clone(), 64 * MB), user.clone());
        (TestServer::new(app).unwrap(), service, store, user)
    }

    #[tokio::test]
    async fn test_traffic_report_over_http() {
        let (server, service, store, user) = setup().await;
        let mut events = service.session_for(&user).subscribe();

        server.post("/api/hazards/capture/arm").await.assert_status_ok();
        let click: Value = server
            .post("/api/hazards/map-clicks")
            .json(&json!({
                "button": "primary",
                "point": { "longitude": -77.61, "latitude": 43.16 }
            }))
            .await
            .json();
        assert_eq!(click["data"]["outcome"], "captured");
        assert_eq!(click["data"]["wizard_open"], true);

        let session: Value = server
            .post("/api/hazards/wizard/category")
            .json(&json!({ "layer_id": 2 }))
            .await
            .json();
        assert_eq!(session["data"]["wizard"]["step"], "pick_subcategory");
        assert_eq!(
            session["data"]["wizard"]["subcategory_options"]
                .as_array()
                .map(Vec::len),
            Some(3)
        );

        server
            .post("/api/hazards/wizard/subcategory")
            .json(&json!({ "code": "2" }))
            .await
            .assert_status_ok();
        server
            .put("/api/hazards/wizard/description")
            .json(&json!({ "description": "Lane shut!" }))
            .await
            .assert_status_ok();
        server.post("/api/hazards/wizard/next").await.assert_status_ok();

        let form = MultipartForm::new()
            .add_part(
                "files",
                Part::bytes(vec![1u8; 3 * MB])
                    .file_name("photo.jpg")
                    .mime_type("image/jpeg"),
            )
            .add_part(
                "files",
                Part::bytes(vec![1u8; 12 * MB])
                    .file_name("clip.mp4")
                    .mime_type("video/mp4"),
            );
        let upload: Value = server
            .post("/api/hazards/wizard/media")
            .multipart(form)
            .await
            .json();
        assert_eq!(upload["data"]["accepted"], 1);
        assert_eq!(upload["data"]["rejected"], json!(["clip.mp4"]));
        assert!(upload["message"]
            .as_str()
            .is_some_and(|m| m.contains("clip.mp4")));

        let review: Value = server.post("/api/hazards/wizard/next").await.json();
        assert_eq!(review["data"]["wizard"]["step"], "review");
        assert_eq!(review["data"]["wizard"]["media"].as_array().map(Vec::len), Some(1));

        let preview_url = review["data"]["wizard"]["media"][0]["preview_url"]
            .as_str()
            .unwrap()
            .to_string();
        server.get(&preview_url).await.assert_status_ok();

        let submitted = server.post("/api/hazards/wizard/submit").await;
        submitted.assert_status(axum::http::StatusCode::ACCEPTED);
        let submitted: Value = submitted.json();
        assert_eq!(submitted["data"]["wizard"]["step"], "confirmation");

        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Ok(HazardEvent::SubmissionCompleted { .. }) = events.recv().await {
                    break;
                }
            }
        })
        .await
        .expect("submission did not complete");
        assert_eq!(lock(&store.features).len(), 1);
        assert_eq!(lock(&store.attachments).len(), 1);

        server.post("/api/hazards/wizard/close").await.assert_status_ok();
        server.post("/api/hazards/capture/arm").await.assert_status_ok();
        server
            .post("/api/hazards/map-clicks")
            .json(&json!({
                "button": "primary",
                "point": { "longitude": -77.6, "latitude": 43.1 }
            }))
            .await
            .assert_status_ok();
        let reopened: Value = server.get("/api/hazards/session").await.json();
        assert_eq!(reopened["data"]["wizard"]["step_index"], 0);
        assert_eq!(reopened["data"]["wizard"]["description"], "");
        assert_eq!(reopened["data"]["wizard"]["open"], true);
    }

    #[tokio::test]
    async fn test_right_click_cancels_capture() {
        let (server, _, store, _) = setup().await;

        server.post("/api/hazards/capture/arm").await.assert_status_ok();
        let click: Value = server
            .post("/api/hazards/map-clicks")
            .json(&json!({
                "button": "secondary",
                "point": { "longitude": -77.61, "latitude": 43.16 }
            }))
            .await
            .json();
        assert_eq!(click["data"]["outcome"], "disarmed");
        assert_eq!(click["data"]["wizard_open"], false);

        let session: Value = server.get("/api/hazards/session").await.json();
        assert_eq!(session["data"]["capture"]["armed"], false);
        assert!(session["data"]["capture"]["point"].is_null());
        assert!(lock(&store.features).is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_click_rejected() {
        let (server, _, _, _) = setup().await;
        server.post("/api/hazards/capture/arm").await.assert_status_ok();

        server
            .post("/api/hazards/map-clicks")
            .json(&json!({
                "button": "primary",
                "point": { "longitude": 200.0, "latitude": 43.16 }
            }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_wizard_actions_require_open_wizard() {
        let (server, _, _, _) = setup().await;

        server
            .post("/api/hazards/wizard/category")
            .json(&json!({ "layer_id": 2 }))
            .await
            .assert_status(axum::http::StatusCode::CONFLICT);
        server
            .post("/api/hazards/wizard/submit")
            .await
            .assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_preview_not_found() {
        let (server, _, _, _) = setup().await;
        server
            .get(&format!("/api/hazards/previews/{}", uuid::Uuid::new_v4()))
            .await
            .assert_status_not_found();
    }
}
