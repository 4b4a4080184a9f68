//! Runtime configuration types for the board.
//!
//! These are the validated values the processors run with. Loading and
//! parsing the config file is handled by the server crate.

mod config_store;

pub use config_store::{ConfigStore, ConfigWatcher};

use std::time::Duration;

/// Reconnection and reconciliation settings for the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Delay before the first retry after a failure.
    pub reconnect_base: Duration,
    /// Upper bound for the exponential backoff.
    pub reconnect_max: Duration,
    /// Re-fetch the full snapshot after every reconnect to recover events
    /// missed while the stream was down.
    pub refetch_on_reconnect: bool,
    /// Most events held back during one snapshot fetch. Past this the
    /// session is abandoned and retried from a fresh subscription.
    pub max_held_events: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reconnect_base: Duration::from_millis(500),
            reconnect_max: Duration::from_secs(30),
            refetch_on_reconnect: true,
            max_held_events: 4096,
        }
    }
}

/// Retention sweep run by the store writer.
///
/// The backend removes listings after an hour; the sweep only drops what a
/// missed `removed` event left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionConfig {
    pub retention: time::Duration,
    pub sweep_interval: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            retention: time::Duration::minutes(90),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Hot-reloadable settings of the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionSettings {
    pub poll_interval: Duration,
    /// Maximum number of items kept in the published feed.
    pub feed_capacity: usize,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            feed_capacity: 100,
        }
    }
}
