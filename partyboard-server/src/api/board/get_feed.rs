use axum::{Json, extract::State, response::IntoResponse};
use partyboard_core::entities::FeedItem;

use crate::state::AppState;

/// `GET /feed`: codes picked up by the ingestion pipeline, newest first.
///
/// Empty when ingestion is disabled.
pub(super) async fn get_feed(state: State<AppState>) -> impl IntoResponse {
    let items: Vec<FeedItem> = state
        .feed
        .as_ref()
        .map(|feed| feed.current().to_vec())
        .unwrap_or_default();
    Json(items)
}
