use compact_str::CompactString;
use serde::Serialize;
use time::OffsetDateTime;

/// A code scraped from the external text feed, with the text it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    /// Extracted code, upper-cased.
    pub code: CompactString,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
}
