pub mod create_listing;
pub mod feed;
pub mod listing;
pub mod tags;
pub mod ws;

pub use create_listing::{CreateListingRequest, ErrorBody, MAX_CODE_LEN, ValidationError};
pub use feed::FeedEntry;
pub use listing::{ListingId, ListingRecord, ListingStatus};
pub use tags::{GameMode, Rank, Region};
pub use ws::PushEvent;
