use crate::message::Message;
use crate::traits::Deliverer;
use axum::body::{Body, Bytes};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{RequestExt, Router, routing};
use futures::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Upper bound on a request body; a message with an embedded image is the
/// largest thing callers send.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    authorization: Arc<str>,
    deliverer: Arc<dyn Deliverer>,
}

impl AppState {
    pub fn new(bearer_token: &str, deliverer: Arc<dyn Deliverer>) -> Self {
        Self {
            authorization: format!("Bearer {bearer_token}").into(),
            deliverer,
        }
    }

    fn is_authorized(&self, request: &Request) -> bool {
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == &*self.authorization)
    }
}

/// Replies with `status` and its canonical reason phrase as a plain-text body.
fn reject(status: StatusCode) -> Response {
    (status, status.canonical_reason().unwrap_or_default()).into_response()
}

async fn remote_addr(request: &mut Request) -> String {
    request
        .extract_parts::<ConnectInfo<SocketAddr>>()
        .await
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

// Runs ahead of routing so rejected requests are logged too.
async fn log_request(mut request: Request, next: Next) -> Response {
    let remote = remote_addr(&mut request).await;
    info!("Got request from {}", remote);
    next.run(request).await
}

/// Collects the body, failing with 413 once it grows past `MAX_BODY_BYTES`
/// and with 400 if the stream itself breaks.
async fn read_body(body: Body) -> Result<Bytes, StatusCode> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            warn!("Failed to read body: {}", e);
            StatusCode::BAD_REQUEST
        })?;
        if buf.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(StatusCode::PAYLOAD_TOO_LARGE);
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(buf))
}

// - POST /
#[tracing::instrument(
    name = "Relay",
    skip_all,
    fields(
        request_id = %Uuid::new_v4(),
    )
)]
async fn relay(State(state): State<AppState>, mut request: Request) -> Response {
    let remote = remote_addr(&mut request).await;

    if !state.is_authorized(&request) {
        warn!("Rejected request from {}: bad bearer token", remote);
        return reject(StatusCode::UNAUTHORIZED);
    }

    let bytes = match read_body(request.into_body()).await {
        Ok(bytes) => bytes,
        Err(status) => {
            warn!("Rejected body from {}: {}", remote, status);
            return reject(status);
        }
    };

    let message = match Message::from_slice(&bytes) {
        Ok(message) => message,
        Err(e) => {
            warn!("Malformed message from {}: {}", remote, e);
            return reject(StatusCode::BAD_REQUEST);
        }
    };

    info!("Got message: {}", message.text);

    match state.deliverer.deliver(&message).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            error!(error = ?e, "Delivery failed: {}", e);
            reject(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn method_not_allowed() -> Response {
    reject(StatusCode::METHOD_NOT_ALLOWED)
}

// Anything off the root path. The method is checked before the path.
async fn fallback(method: Method) -> Response {
    if method != Method::POST {
        return reject(StatusCode::METHOD_NOT_ALLOWED);
    }
    reject(StatusCode::NOT_FOUND)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", routing::post(relay).fallback(method_not_allowed))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_request))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Serves the relay on `listener` until SIGINT or SIGTERM.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Relay shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
