use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use partyboard_core::filter::{FilterSpec, filter};
use partyboard_sdk::objects::ListingRecord;

use crate::state::AppState;

/// `GET /listings`: current board, newest first.
///
/// Every query parameter (`region`, `rank`, `game_mode`, `status`) is an
/// optional predicate; omitted ones match everything.
pub(super) async fn list_listings(
    state: State<AppState>,
    Query(spec): Query<FilterSpec>,
) -> impl IntoResponse {
    let board = state.board.current();
    let listings: Vec<ListingRecord> = filter(board.iter(), &spec)
        .into_iter()
        .map(ListingRecord::from)
        .collect();
    Json(listings)
}
