//! Listing records as served by the backend snapshot endpoint and carried in
//! `created` push events.

use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use super::tags::{GameMode, Rank, Region};

/// Opaque, server-assigned listing identifier.
///
/// The backend may encode ids as JSON strings or integers; both are accepted
/// and normalised to their decimal/string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ListingId(CompactString);

impl ListingId {
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl<'de> Deserialize<'de> for ListingId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = ListingId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer listing id")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<ListingId, E> {
                if v.is_empty() {
                    return Err(E::invalid_length(0, &self));
                }
                Ok(ListingId(v.into()))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<ListingId, E> {
                Ok(ListingId(CompactString::from(v.to_string())))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<ListingId, E> {
                Ok(ListingId(CompactString::from(v.to_string())))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Lifecycle status as reported by the backend.
///
/// `Removed` never appears on the wire: removal is signalled by a `removed`
/// push event or by the row's absence from a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Active,
    Expired,
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingStatus::Active => write!(f, "active"),
            ListingStatus::Expired => write!(f, "expired"),
        }
    }
}

/// One listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: ListingId,
    /// Party join code. Older backends call this field `party_code`.
    #[serde(alias = "party_code")]
    pub code: CompactString,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_region")]
    pub region: Region,
    #[serde(default)]
    pub rank: Option<Rank>,
    #[serde(default)]
    pub game_mode: Option<GameMode>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub status: ListingStatus,
}

fn default_region() -> Region {
    Region::Unknown
}
