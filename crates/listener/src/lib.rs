//! OrderPilot HTTP front end.
//!
//! Exposes every [`handlers::FulfillmentService`] operation as a JSON route
//! on an axum [`Router`]:
//!
//! | Route | Method | Operation |
//! |-------|--------|-----------|
//! | `/new-order` | POST | Snipcart `order.completed` webhook |
//! | `/pod-webhook` | GET, POST | Liveness check; vendor shipment notices |
//! | `/track-order` | GET | Customer order-status lookup |
//! | `/manage-settings` | GET, POST | Read and update autopilot toggles |
//! | `/get-stats` | GET | Ledger financial summary |
//! | `/health` | GET | Process liveness |
//!
//! Requests with the wrong method get `405` and unknown paths `404`, both
//! with the usual JSON error body. Every request runs inside a
//! span carrying a fresh [`fulfillment::InvocationId`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport details, request decoding, and status-code
//! mapping live here. The [`handlers`] crate never sees HTTP types.

use std::future::Future;
use std::net::SocketAddr;

use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use fulfillment::InvocationId;
use handlers::FulfillmentService;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn};

pub mod error;
mod routes;

pub use error::{ApiError, ApiErrorBody, ListenerError};
pub use routes::MessageResponse;

/// Builds the application router around `service`.
pub fn router(service: FulfillmentService) -> Router {
    // The storefront calls track-order and get-stats from the browser.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        info_span!(
            "request",
            method = %req.method(),
            path = %req.uri().path(),
            invocation_id = %InvocationId::new_random(),
        )
    });

    Router::new()
        .route("/new-order", post(routes::new_order))
        .route(
            "/pod-webhook",
            get(routes::pod_webhook_status).post(routes::pod_webhook),
        )
        .route("/track-order", get(routes::track_order))
        .route(
            "/manage-settings",
            get(routes::list_settings).post(routes::update_setting),
        )
        .route("/get-stats", get(routes::stats))
        .route("/health", get(routes::health))
        .method_not_allowed_fallback(routes::method_not_allowed)
        .fallback(routes::not_found)
        .with_state(service)
        .layer(trace)
        .layer(cors)
}

/// Binds `addr`.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ListenerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })
}

/// Serves `service` on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    service: FulfillmentService,
    shutdown: F,
) -> Result<(), ListenerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, "webhook listener started");
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!(%addr, "webhook listener stopped");
    Ok(())
}

/// A listener running on a background task.
///
/// Stops when [`Server::shutdown`] is called or the handle is dropped.
pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Server {
    /// Binds `addr` and starts serving in the background. Bind to port `0` to
    /// let the OS pick a free port; [`Server::addr`] reports the one chosen.
    pub async fn start(addr: SocketAddr, service: FulfillmentService) -> Result<Self, ListenerError> {
        let listener = bind(addr).await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let stopped = async move {
                let _ = shutdown_rx.await;
            };
            if let Err(err) = serve(listener, service, stopped).await {
                warn!(error = %err, "background listener failed");
            }
        });

        Ok(Self {
            addr,
            shutdown: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signals the background task to stop accepting connections.
    pub fn shutdown(&mut self) {
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.send(());
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.shutdown();
    }
}
