//! Backend-facing implementations of the processor traits.
//!
//! Binds the SDK clients to [`SnapshotSource`], [`EventChannel`],
//! [`FeedSource`] and [`PostBackend`], converting wire records into
//! entities and client errors into the processors' error kinds.

use crate::entities::Listing;
use crate::events::{ListingEventSender, listing_event_channel};
use crate::processors::{
    EventChannel, FeedSource, IngestError, PostBackend, PostError, SnapshotSource, Subscription,
    SyncError,
};
use async_trait::async_trait;
use partyboard_sdk::client::{BoardClient, ClientError, EventStream, FeedClient};
use partyboard_sdk::objects::{CreateListingRequest, ListingRecord};
use tracing::{debug, info, warn};
use url::Url;

#[async_trait]
impl SnapshotSource for BoardClient {
    async fn fetch_snapshot(&self) -> Result<Vec<Listing>, SyncError> {
        let records = self
            .list_listings()
            .await
            .map_err(|e| SyncError::Fetch(e.to_string()))?;
        Ok(records.into_iter().map(Listing::from).collect())
    }
}

#[async_trait]
impl PostBackend for BoardClient {
    async fn create(&self, request: &CreateListingRequest) -> Result<ListingRecord, PostError> {
        Ok(self.create_listing(request).await?)
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch(&self) -> Result<Vec<String>, IngestError> {
        self.fetch_texts()
            .await
            .map_err(|e| IngestError::Fetch(e.to_string()))
    }
}

/// Push events over a WebSocket.
///
/// Every subscription opens its own connection; a spawned pump task decodes
/// frames into the subscription's channel until the socket closes.
#[derive(Debug, Clone)]
pub struct WebSocketEventChannel {
    url: Url,
}

impl WebSocketEventChannel {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl EventChannel for WebSocketEventChannel {
    async fn subscribe(&self) -> Result<Subscription, SyncError> {
        let stream = EventStream::connect(&self.url)
            .await
            .map_err(|e| SyncError::TransportDisconnect(e.to_string()))?;
        info!(url = %self.url, "Event stream connected");

        let (events_tx, events_rx) = listing_event_channel();
        let pump = tokio::spawn(pump_events(stream, events_tx));
        Ok(Subscription::new(events_rx, pump))
    }
}

async fn pump_events(mut stream: EventStream, events_tx: ListingEventSender) {
    loop {
        match stream.next_event().await {
            Some(Ok(event)) => {
                if events_tx.send(event.into()).await.is_err() {
                    debug!("Subscription dropped, closing event stream");
                    let _ = stream.close().await;
                    return;
                }
            }
            Some(Err(ClientError::Json(e))) => {
                warn!(error = %e, "Skipping undecodable push event");
            }
            Some(Err(e)) => {
                warn!(error = %e, "Event stream failed");
                return;
            }
            None => {
                info!("Event stream closed by server");
                return;
            }
        }
    }
}
