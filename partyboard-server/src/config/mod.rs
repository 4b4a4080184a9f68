//! Configuration module for partyboard-server.
//!
//! Handles loading configuration from the TOML file and CLI arguments,
//! validating it and splitting it into the runtime sections each processor
//! takes.

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
use crate::config::runtime::{
    BackendConfig, IngestionConfig, IngestionSettings, RetentionConfig, ServerConfig, SyncConfig,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// The backend removes listings an hour after creation; retaining less than
/// that would drop listings that are still live.
const MIN_RETENTION_MINUTES: u32 = 60;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub sync: SyncConfig,
    pub retention: RetentionConfig,
    pub ingestion: Option<IngestionConfig>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Build the runtime sections
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_from_str(&config_content)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn load_from_str(&self, content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        self.validate(&file_config)?;
        self.build_loaded_config(file_config)
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let invalid =
            |msg: String| -> Result<(), ConfigError> { Err(ConfigError::ValidationError(msg)) };

        if !matches!(config.backend.base_url.scheme(), "http" | "https") {
            return invalid(format!(
                "backend.base_url must be http or https, got {}",
                config.backend.base_url
            ));
        }
        if let Some(events_url) = &config.backend.events_url {
            if !matches!(events_url.scheme(), "ws" | "wss") {
                return invalid(format!(
                    "backend.events_url must be ws or wss, got {events_url}"
                ));
            }
        }

        let sync = &config.sync;
        if sync.reconnect_base_ms == 0 {
            return invalid("sync.reconnect_base_ms must be positive".into());
        }
        if sync.reconnect_max_ms < sync.reconnect_base_ms {
            return invalid("sync.reconnect_max_ms must not be below reconnect_base_ms".into());
        }
        if sync.max_held_events == 0 {
            return invalid("sync.max_held_events must be positive".into());
        }
        if sync.retention_minutes < MIN_RETENTION_MINUTES {
            return invalid(format!(
                "sync.retention_minutes must be at least {MIN_RETENTION_MINUTES}"
            ));
        }
        if sync.sweep_interval_secs == 0 {
            return invalid("sync.sweep_interval_secs must be positive".into());
        }

        let ingestion = &config.ingestion;
        if ingestion.enabled && ingestion.feed_url.is_none() {
            return invalid("ingestion.feed_url is required when ingestion is enabled".into());
        }
        if ingestion.poll_interval_secs == 0 {
            return invalid("ingestion.poll_interval_secs must be positive".into());
        }
        if ingestion.feed_capacity == 0 {
            return invalid("ingestion.feed_capacity must be positive".into());
        }
        Ok(())
    }

    fn build_loaded_config(&self, file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        let FileConfig {
            server,
            backend,
            sync,
            ingestion,
        } = file_config;

        let events_url = match backend.events_url {
            Some(url) => url,
            None => derive_events_url(&backend.base_url)?,
        };

        let ingestion = match (ingestion.enabled, ingestion.feed_url) {
            (true, Some(feed_url)) => Some(IngestionConfig {
                feed_url,
                seen_capacity: ingestion.seen_capacity,
                settings: IngestionSettings {
                    poll_interval: Duration::from_secs(ingestion.poll_interval_secs),
                    feed_capacity: ingestion.feed_capacity,
                },
            }),
            _ => None,
        };

        Ok(LoadedConfig {
            server: ServerConfig {
                listen: server.listen,
            },
            backend: BackendConfig {
                base_url: backend.base_url,
                events_url,
            },
            sync: SyncConfig {
                reconnect_base: Duration::from_millis(sync.reconnect_base_ms),
                reconnect_max: Duration::from_millis(sync.reconnect_max_ms),
                refetch_on_reconnect: sync.refetch_on_reconnect,
                max_held_events: sync.max_held_events,
            },
            retention: RetentionConfig {
                retention: time::Duration::minutes(i64::from(sync.retention_minutes)),
                sweep_interval: Duration::from_secs(sync.sweep_interval_secs),
            },
            ingestion,
        })
    }
}

/// `http://host/api` -> `ws://host/api/ws`.
fn derive_events_url(base_url: &Url) -> Result<Url, ConfigError> {
    let mut url = base_url.clone();
    let scheme = if base_url.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme).map_err(|()| {
        ConfigError::ValidationError(format!("cannot derive events url from {base_url}"))
    })?;
    let path = format!("{}/ws", base_url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_query(None);
    Ok(url)
}
