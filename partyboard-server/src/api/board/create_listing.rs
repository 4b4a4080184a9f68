use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use kanau::processor::Processor;
use partyboard_sdk::objects::{CreateListingRequest, ListingRecord};

use super::BoardApiError;
use crate::state::AppState;

/// `POST /listings`: post a new listing.
///
/// The request is validated locally, forwarded to the backend, and the
/// created listing is queued onto the board before responding.
pub(super) async fn create_listing(
    state: State<AppState>,
    Json(request): Json<CreateListingRequest>,
) -> Result<impl IntoResponse, BoardApiError> {
    let listing = state.poster.process(request).await?;
    Ok((StatusCode::CREATED, Json(ListingRecord::from(&listing))))
}
