//! Domain entities held by the board and the ingestion feed.
//!
//! Tag enums, ids and the status enum are shared with the wire format and
//! re-exported from `partyboard-sdk`.

mod feed_item;
mod listing;

pub use feed_item::FeedItem;
pub use listing::Listing;
pub use partyboard_sdk::objects::{GameMode, ListingId, ListingStatus, Rank, Region};
