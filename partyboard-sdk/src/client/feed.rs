//! External text feed client (ingestion pipeline source).

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::FeedEntry;

/// Fetches the raw text items of an unstructured feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: Client,
    url: Url,
}

impl FeedClient {
    pub fn new(url: Url) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET {url}`: the feed's current items, oldest first as served.
    pub async fn fetch_texts(&self) -> Result<Vec<String>, ClientError> {
        let resp = self.http.get(self.url.clone()).send().await?;
        let entries: Vec<FeedEntry> = parse_response(resp).await?;
        Ok(entries.into_iter().map(FeedEntry::into_text).collect())
    }
}
