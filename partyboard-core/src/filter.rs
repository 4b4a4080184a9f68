//! Derived views over the board.

use serde::Deserialize;

use crate::entities::{GameMode, Listing, ListingStatus, Rank, Region};

/// Independent, optional predicates over a listing. Unset fields match
/// everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub rank: Option<Rank>,
    #[serde(default)]
    pub game_mode: Option<GameMode>,
    #[serde(default)]
    pub status: Option<ListingStatus>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        *self == FilterSpec::default()
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.region.is_none_or(|region| listing.region == region)
            && self.rank.is_none_or(|rank| listing.rank == Some(rank))
            && self.game_mode.is_none_or(|mode| listing.game_mode == Some(mode))
            && self.status.is_none_or(|status| listing.status == status)
    }
}

/// Keep the listings that match every set predicate of `spec`, in input
/// order.
pub fn filter<'a, I>(listings: I, spec: &FilterSpec) -> Vec<&'a Listing>
where
    I: IntoIterator<Item = &'a Listing>,
{
    listings.into_iter().filter(|l| spec.matches(l)).collect()
}
