//! WebSocket message types for the listing event stream.
//!
//! The backend pushes one JSON text frame per lifecycle change. Frames are
//! internally tagged so the client can dispatch on the `"type"` field:
//!
//! ```json
//! {"type":"created","record":{ ... }}
//! {"type":"expired","id":"p-17"}
//! {"type":"removed","id":"p-17"}
//! ```
//!
//! Delivery is at-least-once and may be reordered within a small window;
//! consumers must apply events idempotently.

use serde::{Deserialize, Serialize};

use super::listing::{ListingId, ListingRecord};

/// Server-to-client push event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// A listing was posted.
    Created { record: ListingRecord },
    /// A listing passed its active window.
    Expired { id: ListingId },
    /// A listing was purged.
    Removed { id: ListingId },
}

impl PushEvent {
    pub fn listing_id(&self) -> &ListingId {
        match self {
            PushEvent::Created { record } => &record.id,
            PushEvent::Expired { id } | PushEvent::Removed { id } => id,
        }
    }
}
