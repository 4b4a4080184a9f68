//! Generic config store with change notification.
//!
//! `ConfigStore<T>` keeps the current value as an `Arc<T>` inside a
//! `watch` channel, so readers get a cheap owned handle and consumers can
//! `await` the next change instead of polling.

use std::sync::Arc;
use tokio::sync::watch;

/// A shared configuration value with change notification.
///
/// Subscribers receive a [`ConfigWatcher`] that can `await` the next
/// [`update`](ConfigStore::update).
pub struct ConfigStore<T> {
    tx: Arc<watch::Sender<Arc<T>>>,
}

/// Receives notifications when a [`ConfigStore`] is updated.
pub struct ConfigWatcher<T> {
    rx: watch::Receiver<Arc<T>>,
}

// -- ConfigStore --------------------------------------------------------

impl<T> ConfigStore<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(Arc::new(initial));
        Self { tx: Arc::new(tx) }
    }

    /// Replace the stored value and notify all watchers.
    pub fn update(&self, value: T) {
        self.tx.send_replace(Arc::new(value));
    }

    pub fn current(&self) -> Arc<T> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> ConfigWatcher<T> {
        ConfigWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T> Clone for ConfigStore<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

// -- ConfigWatcher ------------------------------------------------------

impl<T> ConfigWatcher<T> {
    /// Wait until the store is updated and return the new value.
    ///
    /// Returns `Err` once every [`ConfigStore`] handle has been dropped.
    pub async fn changed(&mut self) -> Result<Arc<T>, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(Arc::clone(&self.rx.borrow_and_update()))
    }

    pub fn current(&self) -> Arc<T> {
        Arc::clone(&self.rx.borrow())
    }
}
