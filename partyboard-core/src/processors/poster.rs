//! Listing creation.
//!
//! `ListingPoster` validates a creation request locally, forwards it to the
//! backend and enqueues the record the backend returns as a `created`
//! event. The later push event for the same id is then a no-op.

use crate::entities::Listing;
use crate::events::{ListingEvent, StoreCommand, StoreCommandSender};
use async_trait::async_trait;
use kanau::processor::Processor;
use partyboard_sdk::client::ClientError;
use partyboard_sdk::objects::{CreateListingRequest, ListingRecord, ValidationError};
use thiserror::Error;
use tracing::{info, warn};

const PROFANITY_MESSAGE: &str =
    "Your post contains inappropriate language. Please revise it and try again.";
const FETCH_FAILED_MESSAGE: &str = "Failed to add party";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PostError {
    /// Rejected locally; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend refused the listing.
    #[error("backend rejected listing: {message}")]
    Rejected { message: String, profanity: bool },

    /// The backend could not be reached or answered garbage.
    #[error("failed to reach backend: {0}")]
    Fetch(String),
}

impl PostError {
    /// Text suitable for showing to the person who submitted the listing.
    pub fn user_message(&self) -> String {
        match self {
            PostError::Validation(e) => e.to_string(),
            PostError::Rejected { profanity: true, .. } => PROFANITY_MESSAGE.to_string(),
            PostError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            PostError::Rejected { .. } | PostError::Fetch(_) => FETCH_FAILED_MESSAGE.to_string(),
        }
    }
}

impl From<ClientError> for PostError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Rejected { body, .. } => PostError::Rejected {
                message: body.message().unwrap_or_default().to_string(),
                profanity: body.is_profanity(),
            },
            other => PostError::Fetch(other.to_string()),
        }
    }
}

/// Backend endpoint that creates listings.
#[async_trait]
pub trait PostBackend: Send + Sync {
    async fn create(&self, request: &CreateListingRequest) -> Result<ListingRecord, PostError>;
}

#[async_trait]
impl<T: PostBackend + ?Sized> PostBackend for Box<T> {
    async fn create(&self, request: &CreateListingRequest) -> Result<ListingRecord, PostError> {
        (**self).create(request).await
    }
}

pub struct ListingPoster<B> {
    backend: B,
    command_tx: StoreCommandSender,
}

impl<B: PostBackend> ListingPoster<B> {
    pub fn new(backend: B, command_tx: StoreCommandSender) -> Self {
        Self {
            backend,
            command_tx,
        }
    }

    /// Validate, create on the backend and enqueue the returned listing.
    pub async fn post(&self, request: CreateListingRequest) -> Result<Listing, PostError> {
        let request = request.validate()?;
        let record = self.backend.create(&request).await.inspect_err(|e| {
            warn!(error = %e, "Listing creation failed");
        })?;

        let listing = Listing::from(record);
        info!(id = %listing.id, code = %listing.code, "Listing created");

        let command = StoreCommand::Apply(ListingEvent::Created(listing.clone()));
        if self.command_tx.send(command).await.is_err() {
            // The backend already has it; the board just will not show it.
            warn!(
                id = %listing.id,
                "Store command queue closed, created listing not enqueued"
            );
        }
        Ok(listing)
    }
}

impl<B: PostBackend> Processor<CreateListingRequest> for ListingPoster<B> {
    type Output = Listing;
    type Error = PostError;

    async fn process(&self, request: CreateListingRequest) -> Result<Listing, PostError> {
        self.post(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ListingId, Region};
    use crate::events::store_command_channel;
    use partyboard_sdk::objects::{ErrorBody, ListingStatus, Rank};
    use reqwest::StatusCode;
    use std::sync::Mutex;
    use time::macros::datetime;

    #[derive(Default)]
    struct FakeBackend {
        response: Mutex<Option<Result<ListingRecord, PostError>>>,
        requests: Mutex<Vec<CreateListingRequest>>,
    }

    impl FakeBackend {
        fn answering(response: Result<ListingRecord, PostError>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl PostBackend for FakeBackend {
        async fn create(
            &self,
            request: &CreateListingRequest,
        ) -> Result<ListingRecord, PostError> {
            self.requests.lock().unwrap().push(request.clone());
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(PostError::Fetch("no response scripted".into())))
        }
    }

    fn request(code: &str, description: &str) -> CreateListingRequest {
        CreateListingRequest {
            code: code.into(),
            description: description.to_string(),
            region: Region::Na,
            rank: Some(Rank::Gold),
            game_mode: None,
            tags: Vec::new(),
        }
    }

    fn record(id: &str, code: &str) -> ListingRecord {
        ListingRecord {
            id: ListingId::from(id),
            code: code.into(),
            description: "need 2 more".to_string(),
            region: Region::Na,
            rank: Some(Rank::Gold),
            game_mode: None,
            tags: Vec::new(),
            created_at: datetime!(2024-05-01 12:00 UTC),
            status: ListingStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_post_enqueues_created_listing() {
        let (command_tx, mut command_rx) = store_command_channel();
        let poster = ListingPoster::new(
            FakeBackend::answering(Ok(record("42", "XYZ789"))),
            command_tx,
        );

        let listing = poster.post(request("  XYZ789 ", " need 2 more ")).await.unwrap();
        assert_eq!(listing.id, ListingId::from("42"));

        let sent = poster.backend.requests.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].code, "XYZ789");
        assert_eq!(sent[0].description, "need 2 more");

        match command_rx.recv().await {
            Some(StoreCommand::Apply(ListingEvent::Created(queued))) => {
                assert_eq!(queued, listing)
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_validation_failure_skips_backend() {
        let (command_tx, mut command_rx) = store_command_channel();
        let poster = ListingPoster::new(FakeBackend::default(), command_tx);

        let err = poster.post(request("TOOLONG1", "desc")).await.unwrap_err();
        assert_eq!(err, PostError::Validation(ValidationError::CodeTooLong));
        assert_eq!(err.user_message(), "Party Code must be 6 characters or less");

        let err = poster.post(request(" ", "")).await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "Please provide both a Party Code and a Description."
        );

        assert!(poster.backend.requests.lock().unwrap().is_empty());
        assert!(command_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_rejection_leaves_board_alone() {
        let (command_tx, mut command_rx) = store_command_channel();
        let poster = ListingPoster::new(
            FakeBackend::answering(Err(PostError::Rejected {
                message: "Profanity detected".into(),
                profanity: true,
            })),
            command_tx,
        );

        let err = poster.post(request("ABC123", "hello")).await.unwrap_err();
        assert_eq!(err.user_message(), PROFANITY_MESSAGE);
        assert!(command_rx.try_recv().is_err());
    }

    #[test]
    fn test_client_error_mapping() {
        let rejected = PostError::from(ClientError::Rejected {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: Some("Profanity is not allowed".into()),
                msg: None,
            },
        });
        assert_eq!(
            rejected,
            PostError::Rejected {
                message: "Profanity is not allowed".into(),
                profanity: true,
            }
        );

        let other = PostError::from(ClientError::Rejected {
            status: StatusCode::CONFLICT,
            body: ErrorBody {
                error: Some("Code already listed".into()),
                msg: None,
            },
        });
        assert_eq!(other.user_message(), "Code already listed");

        let api = PostError::from(ClientError::Api {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream down".into(),
        });
        assert!(matches!(api, PostError::Fetch(_)));
        assert_eq!(api.user_message(), FETCH_FAILED_MESSAGE);
    }
}
