//! Validated runtime configuration.
//!
//! Processor settings are defined in `partyboard-core::config`; this module
//! re-exports them next to the server-only sections.

pub use partyboard_core::config::{IngestionSettings, RetentionConfig, SyncConfig};

use std::net::SocketAddr;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: Url,
    pub events_url: Url,
}

/// Present only when ingestion is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionConfig {
    pub feed_url: Url,
    pub seen_capacity: Option<usize>,
    /// The hot-reloadable part.
    pub settings: IngestionSettings,
}
