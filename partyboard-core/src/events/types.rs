//! Event and command types flowing into the store writer.

use partyboard_sdk::objects::PushEvent;

use crate::entities::{Listing, ListingId};

/// A single lifecycle change for one listing.
///
/// Events carry only what the matching store mutator needs. They are
/// idempotent, so at-least-once delivery and small reorderings are safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEvent {
    Created(Listing),
    Expired(ListingId),
    Removed(ListingId),
}

impl ListingEvent {
    pub fn listing_id(&self) -> &ListingId {
        match self {
            ListingEvent::Created(listing) => &listing.id,
            ListingEvent::Expired(id) | ListingEvent::Removed(id) => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ListingEvent::Created(_) => "created",
            ListingEvent::Expired(_) => "expired",
            ListingEvent::Removed(_) => "removed",
        }
    }
}

impl From<PushEvent> for ListingEvent {
    fn from(event: PushEvent) -> Self {
        match event {
            PushEvent::Created { record } => ListingEvent::Created(record.into()),
            PushEvent::Expired { id } => ListingEvent::Expired(id),
            PushEvent::Removed { id } => ListingEvent::Removed(id),
        }
    }
}

/// A mutation queued for the store writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    /// Swap the whole board for a freshly fetched snapshot.
    ReplaceAll(Vec<Listing>),
    /// Apply one lifecycle event.
    Apply(ListingEvent),
}
