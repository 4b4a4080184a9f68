use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use super::tags::{GameMode, Rank, Region};

/// Longest party code the backend accepts.
pub const MAX_CODE_LEN: usize = 6;

/// Request payload for `POST /parties`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateListingRequest {
    pub code: CompactString,
    pub description: String,
    pub region: Region,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<Rank>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_mode: Option<GameMode>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Creation input rejected locally, before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please provide both a Party Code and a Description.")]
    MissingCodeAndDescription,
    #[error("Please provide a Party Code.")]
    MissingCode,
    #[error("Please provide a Description.")]
    MissingDescription,
    #[error("Party Code must be 6 characters or less")]
    CodeTooLong,
}

impl CreateListingRequest {
    /// Check the request and return it with code and description trimmed.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        let code = self.code.trim();
        let description = self.description.trim();
        match (code.is_empty(), description.is_empty()) {
            (true, true) => return Err(ValidationError::MissingCodeAndDescription),
            (true, false) => return Err(ValidationError::MissingCode),
            (false, true) => return Err(ValidationError::MissingDescription),
            (false, false) => {}
        }
        if code.chars().count() > MAX_CODE_LEN {
            return Err(ValidationError::CodeTooLong);
        }
        self.code = CompactString::from(code);
        self.description = description.to_owned();
        self.tags.retain(|t| !t.trim().is_empty());
        Ok(self)
    }
}

/// Error body returned by the backend.
///
/// Creation failures carry `error`; other endpoints have been seen to use
/// `msg`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.error.as_deref().or(self.msg.as_deref())
    }

    /// The backend signals its profanity filter only through the error text.
    pub fn is_profanity(&self) -> bool {
        self.message()
            .is_some_and(|m| m.to_ascii_lowercase().contains("profanity"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(code: &str, description: &str) -> CreateListingRequest {
        CreateListingRequest {
            code: code.into(),
            description: description.to_string(),
            region: Region::Eu,
            rank: None,
            game_mode: None,
            tags: vec![],
        }
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            request(" ", "").validate(),
            Err(ValidationError::MissingCodeAndDescription)
        );
        assert_eq!(
            request("", "need 2").validate(),
            Err(ValidationError::MissingCode)
        );
        assert_eq!(
            request("ABC123", "  ").validate(),
            Err(ValidationError::MissingDescription)
        );
        assert_eq!(
            request("ABC1234", "need 2").validate(),
            Err(ValidationError::CodeTooLong)
        );
        assert_eq!(
            ValidationError::CodeTooLong.to_string(),
            "Party Code must be 6 characters or less"
        );
    }

    #[test]
    fn test_validation_trims_input() {
        let mut req = request(" abc123 ", " need 2 ");
        req.tags = vec!["mic".into(), "  ".into()];
        let req = req.validate().unwrap();
        assert_eq!(req.code, "abc123");
        assert_eq!(req.description, "need 2");
        assert_eq!(req.tags, vec!["mic"]);
    }

    #[test]
    fn test_profanity_detection() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error":"Profanity is not allowed"}"#).unwrap();
        assert!(body.is_profanity());
        let body: ErrorBody = serde_json::from_str(r#"{"msg":"server busy"}"#).unwrap();
        assert!(!body.is_profanity());
        assert_eq!(body.message(), Some("server busy"));
    }
}
