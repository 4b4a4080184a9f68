//! Axum server setup and router configuration.

use crate::api;
use crate::state::AppState;
use axum::{Json, Router, response::IntoResponse, routing::get};
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .merge(api::board::router())
        // Add state to all routes
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run the server until `shutdown` resolves, then drain connections.
pub async fn run_server(
    router: Router,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use partyboard_core::events::store_command_channel;
    use partyboard_core::processors::{PostBackend, PostError, SyncStatus};
    use partyboard_core::store::ListingStore;
    use partyboard_sdk::objects::{CreateListingRequest, ListingRecord};
    use tokio::sync::watch;
    use tower::ServiceExt;

    struct Unreachable;

    #[async_trait::async_trait]
    impl PostBackend for Unreachable {
        async fn create(
            &self,
            _request: &CreateListingRequest,
        ) -> Result<ListingRecord, PostError> {
            Err(PostError::Fetch("unreachable".into()))
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let store = ListingStore::new();
        let (command_tx, _command_rx) = store_command_channel();
        let (_status_tx, status_rx) = watch::channel(SyncStatus::default());
        let backend: Box<dyn PostBackend> = Box::new(Unreachable);
        let state = AppState::new(
            store.reader(),
            None,
            crate::state::Poster::new(backend, command_tx),
            status_rx,
        );

        let response = build_router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
