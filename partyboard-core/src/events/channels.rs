//! Channel factories and handles.

use super::types::{ListingEvent, StoreCommand};
use tokio::sync::mpsc;

/// Default buffer size for event channels.
///
/// This provides enough buffer to handle bursts while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for the store command queue.
pub type StoreCommandSender = mpsc::Sender<StoreCommand>;
/// Receiver handle for the store command queue.
pub type StoreCommandReceiver = mpsc::Receiver<StoreCommand>;

/// Sender handle for decoded push events of one subscription.
pub type ListingEventSender = mpsc::Sender<ListingEvent>;
/// Receiver handle for decoded push events of one subscription.
pub type ListingEventReceiver = mpsc::Receiver<ListingEvent>;

/// Create the store command queue.
///
/// There is exactly one receiver, owned by the
/// [`StoreWriter`](crate::processors::StoreWriter); every producer (the
/// synchronizer, the listing poster) holds a clone of the sender, so all
/// mutations are serialized in enqueue order.
pub fn store_command_channel() -> (StoreCommandSender, StoreCommandReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a channel for one event subscription.
pub fn listing_event_channel() -> (ListingEventSender, ListingEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
