//! Board API handlers.
//!
//! These endpoints are called by the presentation layer. They read from
//! the store and feed snapshots and never block on the writer.
//!
//! # Endpoints
//!
//! - `GET  /listings`: filtered board, newest first
//! - `POST /listings`: validate and post a new listing
//! - `GET  /feed`: ingested codes, newest first
//! - `GET  /sync`: synchronizer status

use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use partyboard_core::processors::PostError;
use serde::Serialize;

use crate::state::AppState;

mod create_listing;
mod get_feed;
mod get_sync_status;
mod list_listings;

/// Build the Board API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/listings",
            get(list_listings::list_listings).post(create_listing::create_listing),
        )
        .route("/feed", get(get_feed::get_feed))
        .route("/sync", get(get_sync_status::get_sync_status))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Error body, shaped like the backend's so clients handle both alike.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Errors that can occur in Board API handlers.
#[derive(Debug)]
enum BoardApiError {
    Post(PostError),
}

impl From<PostError> for BoardApiError {
    fn from(e: PostError) -> Self {
        BoardApiError::Post(e)
    }
}

impl IntoResponse for BoardApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            BoardApiError::Post(e) => {
                let status = match &e {
                    PostError::Validation(_) => StatusCode::BAD_REQUEST,
                    PostError::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    PostError::Fetch(_) => {
                        tracing::error!(error = %e, "Board API backend error");
                        StatusCode::BAD_GATEWAY
                    }
                };
                let body = ErrorResponse {
                    error: e.user_message(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
