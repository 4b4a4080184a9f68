use serde::{Deserialize, Serialize};

/// Server region a party is hosted on.
///
/// Unrecognised values deserialize to [`Region::Unknown`] so a backend that
/// adds a region does not break snapshot parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Na,
    Eu,
    Asia,
    Sea,
    Oce,
    Sa,
    Me,
    #[serde(other)]
    Unknown,
}

/// Rank bracket a party is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rank {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Grandmaster,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Ranked,
    Casual,
    Custom,
    Arcade,
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_wire_names() {
        assert_eq!(serde_json::to_string(&Region::Eu).unwrap(), "\"EU\"");
        assert_eq!(serde_json::to_string(&Rank::Gold).unwrap(), "\"GOLD\"");
        assert_eq!(
            serde_json::to_string(&GameMode::Ranked).unwrap(),
            "\"ranked\""
        );
    }

    #[test]
    fn test_unknown_values_are_tolerated() {
        let region: Region = serde_json::from_str("\"MARS\"").unwrap();
        assert_eq!(region, Region::Unknown);
        let rank: Rank = serde_json::from_str("\"CHALLENGER\"").unwrap();
        assert_eq!(rank, Rank::Unknown);
    }
}
