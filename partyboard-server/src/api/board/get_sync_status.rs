use axum::{Json, extract::State, response::IntoResponse};

use crate::state::AppState;

/// `GET /sync`: synchronizer connection state and last error.
pub(super) async fn get_sync_status(state: State<AppState>) -> impl IntoResponse {
    let status = state.sync_status.borrow().clone();
    Json(status)
}
