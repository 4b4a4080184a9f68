//! Push-event stream client.

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use super::ClientError;
use crate::objects::PushEvent;

/// A connected listing event stream.
///
/// See [`crate::objects::ws`] for the frame format. The stream ends (returns
/// `None`) when the server closes the connection.
pub struct EventStream {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl EventStream {
    /// Open the WebSocket at `url`.
    pub async fn connect(url: &Url) -> Result<Self, ClientError> {
        let (socket, _response) = tokio_tungstenite::connect_async(url.as_str()).await?;
        Ok(Self { socket })
    }

    /// Wait for the next push event.
    ///
    /// Control frames are skipped. A text frame that fails to parse is
    /// returned as `Some(Err(ClientError::Json))` so the caller can log it and
    /// keep reading.
    pub async fn next_event(&mut self) -> Option<Result<PushEvent, ClientError>> {
        loop {
            match self.socket.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(serde_json::from_str(&text).map_err(ClientError::Json));
                }
                Ok(Message::Binary(data)) => {
                    return Some(serde_json::from_slice(&data).map_err(ClientError::Json));
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    /// Send a normal close frame.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.socket.close(None).await?;
        Ok(())
    }
}
