//! Listing backend client (board → backend).

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response, with_trailing_slash};
use crate::objects::{CreateListingRequest, ListingRecord};

/// Typed HTTP client for the listing backend.
///
/// Endpoints are resolved relative to `base_url`, so a backend mounted under
/// a path prefix (e.g. `https://lfg.example.com/api`) works unchanged.
#[derive(Debug, Clone)]
pub struct BoardClient {
    http: Client,
    base_url: Url,
}

impl BoardClient {
    /// Create a new `BoardClient` for the backend rooted at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url: with_trailing_slash(base_url),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /parties`: full snapshot of current listings, in no guaranteed
    /// order.
    pub async fn list_listings(&self) -> Result<Vec<ListingRecord>, ClientError> {
        let url = self.base_url.join("parties")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /parties`: post a new listing.
    ///
    /// Backend-side rejections (including the profanity filter) surface as
    /// [`ClientError::Rejected`].
    pub async fn create_listing(
        &self,
        request: &CreateListingRequest,
    ) -> Result<ListingRecord, ClientError> {
        let url = self.base_url.join("parties")?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }
}
