pub mod health;

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::application::envelope::Envelope;
use crate::application::handlers;
use crate::application::messages;
use crate::state::AppState;

/// Path the original static front-end posts to.
pub const LEGACY_SUBMIT_PATH: &str = "/php/form.php";

pub fn build_router(state: AppState) -> Router {
    let submit = || post(handlers::handle_submit).fallback(handlers::handle_method_not_allowed);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/applications", submit())
        .route("/api/v1/applications/schema", get(handlers::handle_schema))
        .route(LEGACY_SUBMIT_PATH, submit())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Last-resort boundary: a panic anywhere in a handler still answers with the envelope.
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!("Handler panicked: {detail}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Envelope::failure(messages::UNEXPECTED_ERROR)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_panic_maps_to_unexpected_error() {
        let response = handle_panic(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], messages::UNEXPECTED_ERROR);
    }
}
