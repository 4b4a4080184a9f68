//! Processors for the board's event-driven pipeline.
//!
//! - `Synchronizer`: Subscribes to push events and loads snapshots, emits
//!   `StoreCommand`s
//! - `ListingPoster`: Creates listings on the backend, emits `StoreCommand`s
//! - `StoreWriter`: Receives `StoreCommand`s, mutates the `ListingStore`
//! - `IngestionPipeline`: Polls the text feed, publishes `FeedItem`s

pub mod ingestion;
pub mod poster;
pub mod store_writer;
pub mod synchronizer;

pub use ingestion::{
    FeedReader, FeedSource, IngestError, IngestionPipeline, SeenSet, extract_code,
};
pub use poster::{ListingPoster, PostBackend, PostError};
pub use store_writer::StoreWriter;
pub use synchronizer::{
    EventChannel, SnapshotSource, Subscription, SyncError, SyncState, SyncStatus, Synchronizer,
};
