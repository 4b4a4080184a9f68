//! IngestionPipeline processor.
//!
//! Polls an external text feed on a fixed interval and turns messages that
//! carry a party code into feed items:
//! - Each raw text is considered once per cycle
//! - The first `AAA000`-shaped token is extracted and upper-cased
//! - Texts without a token, or whose code was already seen, are discarded
//! - Accepted items are prepended to the feed, keeping their source order
//!
//! The poll interval and feed capacity follow a [`ConfigStore`] and can be
//! changed while running.

use crate::config::{ConfigStore, IngestionSettings};
use crate::entities::FeedItem;
use crate::utils::wait_for_shutdown;
use async_trait::async_trait;
use compact_str::CompactString;
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

lazy_static! {
    static ref CODE_PATTERN: Regex = code_pattern();
}

#[allow(clippy::expect_used)]
fn code_pattern() -> Regex {
    Regex::new(r"[A-Za-z]{3}[0-9]{3}").expect("party code pattern is valid")
}

/// First party code in `text`, canonicalized to upper case.
pub fn extract_code(text: &str) -> Option<CompactString> {
    CODE_PATTERN
        .find(text)
        .map(|m| CompactString::from(m.as_str().to_ascii_uppercase()))
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("feed fetch failed: {0}")]
    Fetch(String),
}

/// Source of raw feed texts.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<String>, IngestError>;
}

/// Codes already turned into feed items.
///
/// Unbounded unless a capacity is given, in which case the oldest codes are
/// forgotten first.
#[derive(Debug, Default)]
pub struct SeenSet {
    codes: HashSet<CompactString>,
    order: VecDeque<CompactString>,
    capacity: Option<usize>,
}

impl SeenSet {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            codes: HashSet::new(),
            order: VecDeque::new(),
            capacity: capacity.filter(|c| *c > 0),
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Record `code`. Returns `false` if it was already present.
    pub fn insert(&mut self, code: CompactString) -> bool {
        if !self.codes.insert(code.clone()) {
            return false;
        }
        if let Some(capacity) = self.capacity {
            self.order.push_back(code);
            while self.order.len() > capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.codes.remove(&oldest);
                }
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Read-only handle on the published feed, newest first.
#[derive(Clone)]
pub struct FeedReader {
    rx: watch::Receiver<Arc<Vec<FeedItem>>>,
}

impl FeedReader {
    pub fn current(&self) -> Arc<Vec<FeedItem>> {
        self.rx.borrow().clone()
    }

    pub async fn changed(&mut self) -> Result<Arc<Vec<FeedItem>>, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(self.rx.borrow_and_update().clone())
    }
}

pub struct IngestionPipeline<F> {
    source: F,
    seen: SeenSet,
    feed: VecDeque<FeedItem>,
    feed_capacity: usize,
    feed_tx: watch::Sender<Arc<Vec<FeedItem>>>,
}

impl<F: FeedSource> IngestionPipeline<F> {
    pub fn new(source: F, seen_capacity: Option<usize>, feed_capacity: usize) -> Self {
        let (feed_tx, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            source,
            seen: SeenSet::new(seen_capacity),
            feed: VecDeque::new(),
            feed_capacity,
            feed_tx,
        }
    }

    pub fn reader(&self) -> FeedReader {
        FeedReader {
            rx: self.feed_tx.subscribe(),
        }
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Fetch once and ingest the result. Returns the number of new items.
    ///
    /// A failed fetch leaves the seen-set and the feed untouched.
    pub async fn poll_once(&mut self) -> Result<usize, IngestError> {
        let texts = self.source.fetch().await?;
        Ok(self.ingest(texts, OffsetDateTime::now_utc()))
    }

    fn ingest(&mut self, texts: Vec<String>, now: OffsetDateTime) -> usize {
        let mut accepted = Vec::new();
        for text in texts.into_iter().unique() {
            let Some(code) = extract_code(&text) else {
                continue;
            };
            if !self.seen.insert(code.clone()) {
                continue;
            }
            accepted.push(FeedItem {
                code,
                text,
                received_at: now,
            });
        }

        let count = accepted.len();
        if count > 0 {
            for item in accepted.into_iter().rev() {
                self.feed.push_front(item);
            }
            self.feed.truncate(self.feed_capacity);
            self.publish();
        }
        count
    }

    fn set_feed_capacity(&mut self, capacity: usize) {
        self.feed_capacity = capacity;
        if self.feed.len() > capacity {
            self.feed.truncate(capacity);
            self.publish();
        }
    }

    fn publish(&self) {
        let items: Vec<FeedItem> = self.feed.iter().cloned().collect();
        self.feed_tx.send_replace(Arc::new(items));
    }

    /// Poll on the configured interval until shutdown.
    ///
    /// An in-flight fetch is abandoned when shutdown fires; the feed keeps
    /// whatever was already published.
    pub async fn run(
        mut self,
        mut shutdown_rx: watch::Receiver<bool>,
        settings: ConfigStore<IngestionSettings>,
    ) {
        let mut watcher = settings.subscribe();
        let mut current = *settings.current();
        self.set_feed_capacity(current.feed_capacity);
        let mut ticker = poll_ticker(current.poll_interval, Instant::now());

        info!(
            poll_interval_secs = current.poll_interval.as_secs(),
            feed_capacity = current.feed_capacity,
            "IngestionPipeline started"
        );

        loop {
            tokio::select! {
                biased;

                _ = wait_for_shutdown(&mut shutdown_rx) => {
                    info!("IngestionPipeline received shutdown signal");
                    break;
                }

                Ok(updated) = watcher.changed() => {
                    if updated.poll_interval != current.poll_interval {
                        ticker = poll_ticker(
                            updated.poll_interval,
                            Instant::now() + updated.poll_interval,
                        );
                    }
                    self.set_feed_capacity(updated.feed_capacity);
                    current = *updated;
                    info!(
                        poll_interval_secs = current.poll_interval.as_secs(),
                        feed_capacity = current.feed_capacity,
                        "IngestionPipeline settings reloaded"
                    );
                }

                _ = ticker.tick() => {
                    tokio::select! {
                        biased;

                        _ = wait_for_shutdown(&mut shutdown_rx) => {
                            info!("IngestionPipeline received shutdown signal during poll");
                            break;
                        }

                        result = self.poll_once() => match result {
                            Ok(accepted) => debug!(
                                accepted,
                                seen = self.seen.len(),
                                "Feed poll complete"
                            ),
                            Err(e) => warn!(error = %e, "Feed poll failed, will retry next tick"),
                        },
                    }
                }
            }
        }

        info!("IngestionPipeline shutdown complete");
    }
}

fn poll_ticker(period: std::time::Duration, start: Instant) -> Interval {
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use time::macros::datetime;

    #[derive(Clone, Default)]
    struct FakeFeed {
        responses: Arc<Mutex<VecDeque<Result<Vec<String>, IngestError>>>>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeFeed {
        fn with(responses: Vec<Result<Vec<&str>, IngestError>>) -> Self {
            let responses: VecDeque<Result<Vec<String>, IngestError>> = responses
                .into_iter()
                .map(|r| r.map(|texts| texts.into_iter().map(String::from).collect()))
                .collect();
            Self {
                responses: Arc::new(Mutex::new(responses)),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl FeedSource for FakeFeed {
        async fn fetch(&self) -> Result<Vec<String>, IngestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn codes(reader: &FeedReader) -> Vec<String> {
        reader.current().iter().map(|i| i.code.to_string()).collect()
    }

    #[test]
    fn test_extract_code() {
        assert_eq!(
            extract_code("need 2 more, code abc123 thanks").as_deref(),
            Some("ABC123")
        );
        assert_eq!(
            extract_code("join XYZ789 then ABC123").as_deref(),
            Some("XYZ789")
        );
        assert_eq!(extract_code("LFG ranked, dm me"), None);
        assert_eq!(extract_code("ab12 or 123abc"), None);
    }

    #[test]
    fn test_seen_set_window() {
        let mut seen = SeenSet::new(Some(2));
        assert!(seen.insert("AAA111".into()));
        assert!(!seen.insert("AAA111".into()));
        assert!(seen.insert("BBB222".into()));
        assert!(seen.insert("CCC333".into()));
        assert_eq!(seen.len(), 2);
        assert!(!seen.contains("AAA111"));
        assert!(seen.contains("CCC333"));

        let mut unbounded = SeenSet::new(None);
        for i in 0..500 {
            assert!(unbounded.insert(format!("AAA{i:03}").into()));
        }
        assert_eq!(unbounded.len(), 500);
    }

    #[tokio::test]
    async fn test_dedup_across_cycles() {
        let feed = FakeFeed::with(vec![
            Ok(vec!["first abc123", "second DEF456", "no code here"]),
            Ok(vec!["again ABC123", "new one ghi789"]),
        ]);
        let mut pipeline = IngestionPipeline::new(feed, None, 100);
        let reader = pipeline.reader();

        assert_eq!(pipeline.poll_once().await.unwrap(), 2);
        assert_eq!(codes(&reader), vec!["ABC123", "DEF456"]);

        assert_eq!(pipeline.poll_once().await.unwrap(), 1);
        assert_eq!(codes(&reader), vec!["GHI789", "ABC123", "DEF456"]);
        assert_eq!(pipeline.seen().len(), 3);
    }

    #[test]
    fn test_ingest_keeps_source_order_and_text() {
        let mut pipeline = IngestionPipeline::new(FakeFeed::default(), None, 100);
        let reader = pipeline.reader();
        let now = datetime!(2024-05-01 12:00 UTC);

        let texts = vec![
            "one AAA111".to_string(),
            "one AAA111".to_string(),
            "two BBB222".to_string(),
            "dup of aaa111 in other words".to_string(),
            "three CCC333".to_string(),
        ];
        assert_eq!(pipeline.ingest(texts, now), 3);

        let feed = reader.current();
        assert_eq!(codes(&reader), vec!["AAA111", "BBB222", "CCC333"]);
        assert_eq!(feed[0].text, "one AAA111");
        assert_eq!(feed[0].received_at, now);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_state() {
        let feed = FakeFeed::with(vec![
            Ok(vec!["code AAA111"]),
            Err(IngestError::Fetch("timeout".into())),
            Ok(vec!["code AAA111", "code BBB222"]),
        ]);
        let mut pipeline = IngestionPipeline::new(feed, None, 100);
        let reader = pipeline.reader();

        pipeline.poll_once().await.unwrap();
        assert_eq!(
            pipeline.poll_once().await,
            Err(IngestError::Fetch("timeout".into()))
        );
        assert_eq!(pipeline.seen().len(), 1);
        assert_eq!(codes(&reader), vec!["AAA111"]);

        assert_eq!(pipeline.poll_once().await.unwrap(), 1);
        assert_eq!(codes(&reader), vec!["BBB222", "AAA111"]);
    }

    #[test]
    fn test_feed_capacity_truncates_oldest() {
        let mut pipeline = IngestionPipeline::new(FakeFeed::default(), None, 2);
        let reader = pipeline.reader();
        let now = datetime!(2024-05-01 12:00 UTC);

        pipeline.ingest(vec!["AAA111".into(), "BBB222".into()], now);
        pipeline.ingest(vec!["CCC333".into()], now);
        assert_eq!(codes(&reader), vec!["CCC333", "AAA111"]);

        pipeline.set_feed_capacity(1);
        assert_eq!(codes(&reader), vec!["CCC333"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_and_reloads() {
        let feed = FakeFeed::with(vec![
            Ok(vec!["AAA111"]),
            Ok(vec!["BBB222"]),
            Ok(vec!["CCC333"]),
        ]);
        let calls = Arc::clone(&feed.calls);
        let pipeline = IngestionPipeline::new(feed, None, 100);
        let mut reader = pipeline.reader();
        let settings = ConfigStore::new(IngestionSettings {
            poll_interval: Duration::from_secs(10),
            feed_capacity: 100,
        });
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(pipeline.run(shutdown_rx, settings.clone()));

        // First tick fires immediately.
        reader.changed().await.unwrap();
        assert_eq!(codes(&reader), vec!["AAA111"]);

        reader.changed().await.unwrap();
        assert_eq!(codes(&reader), vec!["BBB222", "AAA111"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        settings.update(IngestionSettings {
            poll_interval: Duration::from_secs(10),
            feed_capacity: 1,
        });
        reader.changed().await.unwrap();
        assert_eq!(codes(&reader), vec!["BBB222"]);

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(60), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
