pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::review::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes();

    Router::new()
        .route("/health", get(health::health_handler))
        // Review API
        .route("/api/v1/reviews", post(handlers::handle_review))
        .route("/api/v1/reviews/upload", post(handlers::handle_upload))
        .route("/api/v1/reviews/report", post(handlers::handle_report))
        .route("/api/v1/reviews/stream", post(handlers::handle_stream))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::review::ingest::PlainTextAdapter;
    use crate::review::pipeline::Pipeline;
    use crate::review::testing::ScriptedClient;

    #[tokio::test]
    async fn test_health_reports_service() {
        let config = Config {
            anthropic_api_key: "test".to_string(),
            port: 0,
            rust_log: "info".to_string(),
            max_upload_mb: 1,
        };
        let app = build_router(AppState {
            pipeline: Pipeline::new(Arc::new(ScriptedClient::new(Vec::new()))),
            adapter: Arc::new(PlainTextAdapter::default()),
            config,
        });

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "reviewer-api");
    }
}
