//! Wire types and clients for the Party Board listing backend.
//!
//! The [`objects`] module holds the JSON shapes exchanged with the backend
//! (snapshot rows, creation requests, push events, ingestion feed entries).
//! The [`client`] module, gated behind the `client` feature, provides the
//! HTTP and WebSocket clients that speak them.

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
