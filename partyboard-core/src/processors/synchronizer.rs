//! Synchronizer processor.
//!
//! The Synchronizer keeps the board in step with the backend. It is
//! responsible for:
//! - Subscribing to the push event stream
//! - Fetching the full snapshot and enqueueing it as one `ReplaceAll`
//! - Forwarding every push event, in arrival order, as an `Apply` command
//! - Reconnecting with capped exponential backoff (with jitter) when the
//!   stream drops, re-fetching the snapshot to recover missed events
//!
//! The subscription is opened before the snapshot is requested. Events that
//! arrive while the fetch is in flight are held back and enqueued right
//! after the replacement, so the replacement can never discard them. The
//! hold-back buffer is capped by `max_held_events`; overflowing it ends the
//! session, and the next one starts over with a fresh snapshot.

use crate::config::SyncConfig;
use crate::entities::Listing;
use crate::events::{ListingEvent, ListingEventReceiver, StoreCommand, StoreCommandSender};
use crate::utils::{Backoff, wait_for_shutdown};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Errors that can occur while synchronizing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// Snapshot request failed. Transient; the store is left untouched.
    #[error("snapshot fetch failed: {0}")]
    Fetch(String),

    /// The event stream could not be opened or dropped.
    #[error("event stream disconnected: {0}")]
    TransportDisconnect(String),

    /// Too many events arrived while a snapshot fetch was still failing.
    #[error("held back {0} events waiting for a snapshot")]
    HeldBackOverflow(usize),

    /// The store writer is gone; nothing left to synchronize into.
    #[error("store command queue closed")]
    QueueClosed,
}

/// Source of full board snapshots.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Vec<Listing>, SyncError>;
}

/// Source of push event subscriptions.
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// Open a new subscription. Each call starts an independent stream.
    async fn subscribe(&self) -> Result<Subscription, SyncError>;
}

/// A live event subscription.
///
/// Dropping it releases the underlying transport: the pump task feeding the
/// receiver, if any, is aborted.
pub struct Subscription {
    events_rx: ListingEventReceiver,
    pump: Option<JoinHandle<()>>,
}

impl Subscription {
    /// A subscription fed by `pump`, which is aborted on drop.
    pub fn new(events_rx: ListingEventReceiver, pump: JoinHandle<()>) -> Self {
        Self {
            events_rx,
            pump: Some(pump),
        }
    }

    pub fn from_receiver(events_rx: ListingEventReceiver) -> Self {
        Self {
            events_rx,
            pump: None,
        }
    }

    /// Next event, or `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<ListingEvent> {
        self.events_rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

/// Connection state reported by the synchronizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncState {
    #[default]
    Connecting,
    Live,
    Reconnecting {
        attempt: u32,
    },
    Stopped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    #[serde(flatten)]
    pub state: SyncState,
    pub snapshot_loaded: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_snapshot_at: Option<OffsetDateTime>,
    /// Most recent error, kept after recovery for diagnostics.
    pub last_error: Option<String>,
}

/// Synchronizer drives snapshot loading and event forwarding.
pub struct Synchronizer<S, E> {
    snapshots: S,
    events: E,
    command_tx: StoreCommandSender,
    config: SyncConfig,
    status_tx: watch::Sender<SyncStatus>,
}

impl<S, E> Synchronizer<S, E>
where
    S: SnapshotSource,
    E: EventChannel,
{
    pub fn new(
        snapshots: S,
        events: E,
        command_tx: StoreCommandSender,
        config: SyncConfig,
    ) -> Self {
        let (status_tx, _) = watch::channel(SyncStatus::default());
        Self {
            snapshots,
            events,
            command_tx,
            config,
            status_tx,
        }
    }

    /// Subscribe to status updates. Take this before calling `run`.
    pub fn status(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    /// Run until shutdown is signaled or the store writer goes away.
    ///
    /// Shutdown drops the active subscription and any pending retry; state
    /// already enqueued is left as is.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            refetch_on_reconnect = self.config.refetch_on_reconnect,
            "Synchronizer started"
        );

        let backoff = Backoff::from(&self.config);
        let mut attempt = 0u32;

        loop {
            let load_snapshot =
                !self.status_tx.borrow().snapshot_loaded || self.config.refetch_on_reconnect;

            let result = tokio::select! {
                biased;

                _ = wait_for_shutdown(&mut shutdown_rx) => {
                    info!("Synchronizer received shutdown signal");
                    break;
                }

                result = self.session(load_snapshot, &backoff, &mut attempt) => result,
            };

            match result {
                Err(SyncError::QueueClosed) => {
                    info!("Store command queue closed, stopping Synchronizer");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, attempt, "Synchronizer session failed");
                    self.record_error(&e);
                }
                Ok(()) => {
                    let e = SyncError::TransportDisconnect("event stream closed".into());
                    warn!(error = %e, "Event stream ended");
                    self.record_error(&e);
                }
            }

            let delay = backoff.jittered(attempt);
            attempt = attempt.saturating_add(1);
            self.set_state(SyncState::Reconnecting { attempt });
            debug!(
                delay_ms = delay.as_millis() as u64,
                attempt,
                "Waiting before reconnect"
            );

            tokio::select! {
                biased;

                _ = wait_for_shutdown(&mut shutdown_rx) => {
                    info!("Synchronizer received shutdown signal");
                    break;
                }

                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.set_state(SyncState::Stopped);
        info!("Synchronizer shutdown complete");
    }

    /// One subscription lifetime. Returns `Ok(())` when the stream ends.
    async fn session(
        &self,
        load_snapshot: bool,
        backoff: &Backoff,
        attempt: &mut u32,
    ) -> Result<(), SyncError> {
        let mut subscription = self.events.subscribe().await?;
        debug!("Subscribed to event stream");

        let mut stream_open = true;
        if load_snapshot {
            let mut held_back = Vec::new();
            let listings = {
                let fetch = self.fetch_snapshot_with_retry(backoff);
                tokio::pin!(fetch);
                loop {
                    tokio::select! {
                        listings = &mut fetch => break listings,
                        event = subscription.next(), if stream_open => match event {
                            Some(_) if held_back.len() >= self.config.max_held_events => {
                                // The next session refetches, so nothing held here is lost.
                                return Err(SyncError::HeldBackOverflow(held_back.len()));
                            }
                            Some(event) => held_back.push(event),
                            None => stream_open = false,
                        },
                    }
                }
            };

            self.enqueue(StoreCommand::ReplaceAll(listings)).await?;
            if !held_back.is_empty() {
                debug!(
                    count = held_back.len(),
                    "Applying events received during snapshot fetch"
                );
            }
            for event in held_back {
                self.enqueue(StoreCommand::Apply(event)).await?;
            }
            self.status_tx.send_modify(|status| {
                status.snapshot_loaded = true;
                status.last_snapshot_at = Some(OffsetDateTime::now_utc());
            });
        }

        if !stream_open {
            return Ok(());
        }

        *attempt = 0;
        self.set_state(SyncState::Live);
        info!("Synchronizer live");

        while let Some(event) = subscription.next().await {
            debug!(id = %event.listing_id(), kind = event.kind(), "Received listing event");
            self.enqueue(StoreCommand::Apply(event)).await?;
        }
        Ok(())
    }

    /// Fetch a snapshot, retrying with backoff until it succeeds.
    ///
    /// Failures never touch the store; they are only logged and reported
    /// through the status channel.
    async fn fetch_snapshot_with_retry(&self, backoff: &Backoff) -> Vec<Listing> {
        let mut attempt = 0u32;
        loop {
            match self.snapshots.fetch_snapshot().await {
                Ok(listings) => {
                    info!(count = listings.len(), "Fetched snapshot");
                    return listings;
                }
                Err(e) => {
                    let delay = backoff.jittered(attempt);
                    warn!(
                        error = %e,
                        attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        "Snapshot fetch failed"
                    );
                    self.record_error(&e);
                    attempt = attempt.saturating_add(1);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn enqueue(&self, command: StoreCommand) -> Result<(), SyncError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| SyncError::QueueClosed)
    }

    fn set_state(&self, state: SyncState) {
        self.status_tx.send_modify(|status| status.state = state);
    }

    fn record_error(&self, error: &SyncError) {
        let message = error.to_string();
        self.status_tx
            .send_modify(|status| status.last_error = Some(message));
    }
}
