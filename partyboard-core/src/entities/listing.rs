use std::collections::BTreeSet;

use compact_str::CompactString;
use partyboard_sdk::objects::ListingRecord;
use time::OffsetDateTime;

use super::{GameMode, ListingId, ListingStatus, Rank, Region};

/// A party listing as held by the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub id: ListingId,
    /// Join code as posted. Codes are case-insensitive; use
    /// [`display_code`](Listing::display_code) for presentation.
    pub code: CompactString,
    pub description: String,
    pub region: Region,
    pub rank: Option<Rank>,
    pub game_mode: Option<GameMode>,
    pub tags: BTreeSet<String>,
    pub created_at: OffsetDateTime,
    pub status: ListingStatus,
}

impl Listing {
    pub fn is_expired(&self) -> bool {
        self.status == ListingStatus::Expired
    }

    pub fn display_code(&self) -> CompactString {
        self.code.to_ascii_uppercase().into()
    }
}

impl From<ListingRecord> for Listing {
    fn from(record: ListingRecord) -> Self {
        Self {
            id: record.id,
            code: record.code,
            description: record.description,
            region: record.region,
            rank: record.rank,
            game_mode: record.game_mode,
            tags: record.tags.into_iter().collect(),
            created_at: record.created_at,
            status: record.status,
        }
    }
}

impl From<&Listing> for ListingRecord {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.clone(),
            code: listing.code.clone(),
            description: listing.description.clone(),
            region: listing.region,
            rank: listing.rank,
            game_mode: listing.game_mode,
            tags: listing.tags.iter().cloned().collect(),
            created_at: listing.created_at,
            status: listing.status,
        }
    }
}
