//! Route modules for the OCR server

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::error::AppError;
use crate::state::AppState;

pub mod health;
pub mod languages;
pub mod ocr;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.config().server.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_check).fallback(method_not_allowed))
        .route("/ocr", post(ocr::extract_text).fallback(method_not_allowed))
        .route(
            "/languages",
            get(languages::list_languages).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
