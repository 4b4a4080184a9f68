use serde::{Deserialize, Serialize};

/// One raw entry of the external text feed.
///
/// Feeds either return bare strings or objects with a `text` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedEntry {
    Text(String),
    Object { text: String },
}

impl FeedEntry {
    pub fn into_text(self) -> String {
        match self {
            FeedEntry::Text(text) | FeedEntry::Object { text } => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_feed_entries() {
        let entries: Vec<FeedEntry> =
            serde_json::from_str(r#"["code abc123", {"text": "lfg XYZ789", "author": "x"}]"#)
                .unwrap();
        let texts: Vec<String> = entries.into_iter().map(FeedEntry::into_text).collect();
        assert_eq!(texts, vec!["code abc123", "lfg XYZ789"]);
    }
}
