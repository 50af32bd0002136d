use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::features::hazards::services::HazardSessionService;
use crate::features::map::handlers;
use crate::features::map::services::LayerCatalog;

/// Routes open to everyone. Config and view adapt when a valid token is sent.
pub fn public_routes(catalog: Arc<LayerCatalog>, sessions: Arc<HazardSessionService>) -> Router {
    let layers = Router::new()
        .route("/api/layers", get(handlers::list_layers))
        .route(
            "/api/layers/{id}/subcategories",
            get(handlers::list_subcategories),
        )
        .with_state(catalog);

    let view = Router::new()
        .route("/api/map/config", get(handlers::get_map_config))
        .route("/api/map/view", get(handlers::get_map_view))
        .with_state(sessions);

    layers.merge(view)
}

/// Routes that require a signed-in user
pub fn protected_routes(
    catalog: Arc<LayerCatalog>,
    sessions: Arc<HazardSessionService>,
) -> Router {
    let layers = Router::new()
        .route("/api/layers/{id}/schema", get(handlers::get_layer_schema))
        .with_state(catalog);

    let view = Router::new()
        .route(
            "/api/map/layers/{id}/visibility",
            put(handlers::set_layer_visibility),
        )
        .with_state(sessions);

    layers.merge(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::hazards::services::orchestrator::testing::RecordingFeatureStore;
    use crate::features::map::services::layer_catalog::testing::sample_catalog;
    use crate::shared::test_helpers::{create_editor_user, create_reporter_user, with_session_user};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    async fn state() -> (Arc<LayerCatalog>, Arc<HazardSessionService>) {
        let catalog = sample_catalog().await;
        let sessions = Arc::new(HazardSessionService::new(
            catalog.clone(),
            Arc::new(RecordingFeatureStore::default()),
        ));
        (catalog, sessions)
    }

    #[tokio::test]
    async fn test_anonymous_config_is_read_only() {
        let (catalog, sessions) = state().await;
        let server = TestServer::new(public_routes(catalog, sessions)).unwrap();

        let body: Value = server.get("/api/map/config").await.json();
        let widgets = body["data"]["widgets"].as_array().unwrap();
        assert_eq!(body["data"]["signed_in"], false);
        assert!(widgets.contains(&json!("hazard_filter")));
        assert!(!widgets.contains(&json!("add_hazard")));
        assert!(!widgets.contains(&json!("layer_list")));
        assert_eq!(body["data"]["hazard_group"]["title"], "Hazards");
        assert_eq!(body["data"]["hazard_group"]["layer_ids"], json!([1, 2, 3, 4, 5]));
    }

    #[tokio::test]
    async fn test_signed_in_config_offers_add_hazard() {
        let (catalog, sessions) = state().await;
        let app = with_session_user(public_routes(catalog, sessions), create_reporter_user());
        let server = TestServer::new(app).unwrap();

        let body: Value = server.get("/api/map/config").await.json();
        let widgets = body["data"]["widgets"].as_array().unwrap();
        assert!(widgets.contains(&json!("add_hazard")));
        assert!(widgets.contains(&json!("layer_list")));
        assert!(!widgets.contains(&json!("editor")));
    }

    #[tokio::test]
    async fn test_subcategories_by_layer() {
        let (catalog, sessions) = state().await;
        let server = TestServer::new(public_routes(catalog, sessions)).unwrap();

        let body: Value = server.get("/api/layers/2/subcategories").await.json();
        assert_eq!(body["data"][1]["name"], "Road Closure");
        assert_eq!(body["data"][1]["code"], "2");

        server
            .get("/api/layers/0/subcategories")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_schema_requires_editor() {
        let (catalog, sessions) = state().await;

        let reporter = TestServer::new(with_session_user(
            protected_routes(catalog.clone(), sessions.clone()),
            create_reporter_user(),
        ))
        .unwrap();
        reporter
            .get("/api/layers/2/schema")
            .await
            .assert_status_forbidden();

        let editor = TestServer::new(with_session_user(
            protected_routes(catalog, sessions),
            create_editor_user(),
        ))
        .unwrap();
        editor.get("/api/layers/2/schema").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_layer_visibility_is_per_user() {
        let (catalog, sessions) = state().await;
        let user = create_reporter_user();
        let server = TestServer::new(with_session_user(
            protected_routes(catalog, sessions.clone()),
            user.clone(),
        ))
        .unwrap();

        let body: Value = server
            .put("/api/map/layers/2/visibility")
            .json(&json!({ "visible": false }))
            .await
            .json();
        assert_eq!(body["data"]["layers"]["2"]["visible"], false);

        let other = sessions.session_for(&create_reporter_user()).map_view();
        assert!(other.layers[&2].visible);

        server
            .put("/api/map/layers/99/visibility")
            .json(&json!({ "visible": true }))
            .await
            .assert_status_not_found();
    }
}
