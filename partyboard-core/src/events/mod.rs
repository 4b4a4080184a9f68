//! Events and commands for the board's single-writer pipeline.
//!
//! # Flow
//!
//! 1. An `EventChannel` subscription yields `ListingEvent`s -> `Synchronizer`
//! 2. `Synchronizer` (and `ListingPoster`) enqueue `StoreCommand`s
//! 3. `StoreWriter` applies each command to the `ListingStore` in order
//!
//! Every command is idempotent per listing id, so duplicates and small
//! reorderings converge to the same board.

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, ListingEventReceiver, ListingEventSender, StoreCommandReceiver,
    StoreCommandSender, listing_event_channel, store_command_channel,
};
pub use types::{ListingEvent, StoreCommand};
