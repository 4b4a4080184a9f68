//! TOML file configuration structures.
//!
//! These structs directly map to the `partyboard.toml` file format. Every
//! section and field has a default, so an empty file is a valid config.

use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub sync: SyncConfig,
    pub ingestion: IngestionConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "127.0.0.1:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 8080))
}

/// Listing backend section.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Push event WebSocket. Derived from `base_url` when omitted.
    #[serde(default)]
    pub events_url: Option<Url>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            events_url: None,
        }
    }
}

#[allow(clippy::expect_used)]
fn default_base_url() -> Url {
    Url::parse("http://localhost:5000").expect("valid default backend url")
}

/// Synchronizer and retention section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub reconnect_base_ms: u64,
    pub reconnect_max_ms: u64,
    pub refetch_on_reconnect: bool,
    pub max_held_events: usize,
    pub retention_minutes: u32,
    pub sweep_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reconnect_base_ms: 500,
            reconnect_max_ms: 30_000,
            refetch_on_reconnect: true,
            max_held_events: 4096,
            retention_minutes: 90,
            sweep_interval_secs: 60,
        }
    }
}

/// Text feed ingestion section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub enabled: bool,
    pub feed_url: Option<Url>,
    pub poll_interval_secs: u64,
    pub feed_capacity: usize,
    /// Cap on remembered codes; unset keeps every code for the process
    /// lifetime.
    pub seen_capacity: Option<usize>,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            feed_url: None,
            poll_interval_secs: 30,
            feed_capacity: 100,
            seen_capacity: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "0.0.0.0:3000"

[backend]
base_url = "https://lfg.example.com/api"
events_url = "wss://lfg.example.com/ws"

[sync]
reconnect_base_ms = 250
reconnect_max_ms = 10000
refetch_on_reconnect = false
retention_minutes = 120
sweep_interval_secs = 30

[ingestion]
enabled = true
feed_url = "https://chat.example.com/messages"
poll_interval_secs = 15
feed_capacity = 50
seen_capacity = 10000
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.backend.base_url.path(), "/api");
        assert_eq!(
            config.backend.events_url.as_ref().map(Url::as_str),
            Some("wss://lfg.example.com/ws")
        );
        assert_eq!(config.sync.reconnect_base_ms, 250);
        assert!(!config.sync.refetch_on_reconnect);
        assert_eq!(config.sync.retention_minutes, 120);
        assert!(config.ingestion.enabled);
        assert_eq!(config.ingestion.poll_interval_secs, 15);
        assert_eq!(config.ingestion.seen_capacity, Some(10_000));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen, default_listen_addr());
        assert_eq!(config.backend.base_url.as_str(), "http://localhost:5000/");
        assert!(config.backend.events_url.is_none());
        assert_eq!(config.sync.reconnect_max_ms, 30_000);
        assert!(config.sync.refetch_on_reconnect);
        assert!(!config.ingestion.enabled);
        assert_eq!(config.ingestion.feed_capacity, 100);
        assert_eq!(config.ingestion.seen_capacity, None);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: FileConfig = toml::from_str("[sync]\nretention_minutes = 75\n").unwrap();
        assert_eq!(config.sync.retention_minutes, 75);
        assert_eq!(config.sync.reconnect_base_ms, 500);
        assert_eq!(config.sync.sweep_interval_secs, 60);
        assert_eq!(config.sync.max_held_events, 4096);
    }

    #[test]
    fn test_invalid_listen_address_is_rejected() {
        let result = toml::from_str::<FileConfig>("[server]\nlisten = \"not an address\"\n");
        assert!(result.is_err());
    }
}
