//! HTTP and WebSocket clients for the Party Board backend.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

mod board;
mod events;
mod feed;

pub use board::BoardClient;
pub use events::EventStream;
pub use feed::FeedClient;

use reqwest::StatusCode;

use crate::objects::ErrorBody;

/// Errors produced by the SDK clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-2xx status with a structured error body.
    #[error("rejected by backend: status {status}, message: {}", .body.message().unwrap_or_default())]
    Rejected { status: StatusCode, body: ErrorBody },

    /// The backend returned a non-2xx status code without a usable body.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// WebSocket handshake or frame error on the event stream.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) if parsed.message().is_some() => ClientError::Rejected {
                status,
                body: parsed,
            },
            _ => ClientError::Api { status, body },
        });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}

/// Make sure `url` ends with `/` so relative endpoint joins keep its path.
pub(crate) fn with_trailing_slash(mut url: url::Url) -> url::Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
