//! Application state shared across all request handlers.

use partyboard_core::processors::{FeedReader, ListingPoster, PostBackend, SyncStatus};
use partyboard_core::store::BoardReader;
use std::sync::Arc;
use tokio::sync::watch;

pub type Poster = ListingPoster<Box<dyn PostBackend>>;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc or
/// a watch receiver).
#[derive(Clone)]
pub struct AppState {
    /// Read side of the listing store.
    pub board: BoardReader,
    /// Ingestion feed, absent when ingestion is disabled.
    pub feed: Option<FeedReader>,
    pub poster: Arc<Poster>,
    pub sync_status: watch::Receiver<SyncStatus>,
}

impl AppState {
    pub fn new(
        board: BoardReader,
        feed: Option<FeedReader>,
        poster: Poster,
        sync_status: watch::Receiver<SyncStatus>,
    ) -> Self {
        Self {
            board,
            feed,
            poster: Arc::new(poster),
            sync_status,
        }
    }
}
