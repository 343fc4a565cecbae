//! Router setup with routes and middleware.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use audicare_core::config::OcrConfig;
use audicare_core::error::AudiCareError;

use crate::handlers;
use crate::state::AppState;

/// Largest accepted request body. Label photos arrive base64-encoded.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The mobile app calls from arbitrary origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/read-medicine-label", post(handlers::read_medicine_label))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the OCR proxy on the configured address.
pub async fn start_server(config: &OcrConfig, state: AppState) -> Result<(), AudiCareError> {
    let addr = format!("{}:{}", config.bind_addr, config.port);
    let router = create_router(state);

    tracing::info!("Starting OCR proxy on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AudiCareError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| AudiCareError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
