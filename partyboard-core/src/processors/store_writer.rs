//! StoreWriter processor.
//!
//! The single consumer of the store command queue. It:
//! - Receives `StoreCommand`s in enqueue order and applies them through the
//!   idempotent `ListingStore` mutators
//! - Runs the retention sweep on a fixed interval
//!
//! Because it is the only task that mutates the store, concurrent
//! producers can never interleave inside one mutation.

use crate::config::RetentionConfig;
use crate::events::{ListingEvent, StoreCommand, StoreCommandReceiver};
use crate::store::ListingStore;
use crate::utils::wait_for_shutdown;
use kanau::processor::Processor;
use std::convert::Infallible;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub struct StoreWriter {
    store: ListingStore,
    retention: RetentionConfig,
}

impl StoreWriter {
    pub fn new(store: ListingStore, retention: RetentionConfig) -> Self {
        Self { store, retention }
    }

    /// Run until shutdown is signaled or every sender is dropped.
    pub async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut command_rx: StoreCommandReceiver,
    ) {
        info!(
            retention_minutes = self.retention.retention.whole_minutes(),
            "StoreWriter started"
        );

        let mut sweep = tokio::time::interval(self.retention.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; nothing to sweep yet.
        sweep.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = wait_for_shutdown(&mut shutdown_rx) => {
                    info!("StoreWriter received shutdown signal");
                    break;
                }

                command = command_rx.recv() => {
                    let Some(command) = command else {
                        info!("Store command channel closed");
                        break;
                    };
                    let Ok(()) = self.process(command).await;
                }

                _ = sweep.tick() => {
                    self.sweep();
                }
            }
        }

        info!("StoreWriter shutdown complete");
    }

    fn sweep(&self) {
        let now = time::OffsetDateTime::now_utc();
        let pruned = self.store.prune_older_than(now, self.retention.retention);
        if pruned > 0 {
            info!(pruned, "Retention sweep dropped stale listings");
        }
    }

    fn apply(&self, event: ListingEvent) -> bool {
        match event {
            ListingEvent::Created(listing) => self.store.apply_create(listing),
            ListingEvent::Expired(id) => self.store.apply_expire(&id),
            ListingEvent::Removed(id) => self.store.apply_remove(&id),
        }
    }
}

impl Processor<StoreCommand> for StoreWriter {
    type Output = ();
    type Error = Infallible;

    async fn process(&self, command: StoreCommand) -> Result<(), Infallible> {
        match command {
            StoreCommand::ReplaceAll(listings) => {
                let received = listings.len();
                let kept = self.store.replace_all(listings);
                info!(received, kept, "Replaced board with snapshot");
            }
            StoreCommand::Apply(event) => {
                let kind = event.kind();
                let id = event.listing_id().clone();
                let changed = self.apply(event);
                debug!(%id, kind, changed, "Applied listing event");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ListingStatus;
    use crate::entities::fixtures::listing;
    use crate::events::store_command_channel;
    use std::time::Duration;
    use time::macros::datetime;

    fn writer(store: &ListingStore) -> StoreWriter {
        StoreWriter::new(store.clone(), RetentionConfig::default())
    }

    #[tokio::test]
    async fn test_commands_apply_in_order() {
        let store = ListingStore::new();
        let writer = writer(&store);
        let t0 = datetime!(2024-05-01 12:00 UTC);

        writer
            .process(StoreCommand::ReplaceAll(vec![listing("a", "AAA111", t0)]))
            .await
            .unwrap();
        writer
            .process(StoreCommand::Apply(ListingEvent::Created(listing(
                "b", "BBB222", t0,
            ))))
            .await
            .unwrap();
        writer
            .process(StoreCommand::Apply(ListingEvent::Expired("a".into())))
            .await
            .unwrap();

        let board = store.view();
        assert_eq!(board.len(), 2);
        assert_eq!(
            board.get(&"a".into()).map(|l| l.status),
            Some(ListingStatus::Expired)
        );
    }

    #[tokio::test]
    async fn test_run_drains_queue_and_stops_on_shutdown() {
        let store = ListingStore::new();
        let mut reader = store.reader();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (command_tx, command_rx) = store_command_channel();
        let handle = tokio::spawn(writer(&store).run(shutdown_rx, command_rx));

        let t0 = datetime!(2024-05-01 12:00 UTC);
        command_tx
            .send(StoreCommand::Apply(ListingEvent::Created(listing(
                "a", "AAA111", t0,
            ))))
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(1), reader.wait_for(|b| b.len() == 1))
            .await
            .unwrap()
            .unwrap();

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_stops_when_senders_dropped() {
        let store = ListingStore::new();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (command_tx, command_rx) = store_command_channel();
        let handle = tokio::spawn(writer(&store).run(shutdown_rx, command_rx));
        drop(command_tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("writer kept running after the queue closed")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_closed_queue_despite_pending_sweep() {
        let store = ListingStore::new();
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (command_tx, command_rx) = store_command_channel();
        let retention = RetentionConfig {
            sweep_interval: Duration::from_secs(1),
            ..RetentionConfig::default()
        };
        let handle =
            tokio::spawn(StoreWriter::new(store.clone(), retention).run(shutdown_rx, command_rx));

        // Let a few sweep ticks pass with the queue still open.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!handle.is_finished());

        let fresh = time::OffsetDateTime::now_utc();
        command_tx
            .send(StoreCommand::Apply(ListingEvent::Created(listing(
                "a", "AAA111", fresh,
            ))))
            .await
            .unwrap();
        drop(command_tx);

        tokio::time::timeout(Duration::from_secs(3), handle)
            .await
            .expect("writer kept running after the queue closed")
            .unwrap();
        // Commands queued before the close are still applied.
        assert_eq!(store.view().len(), 1);
    }
}
