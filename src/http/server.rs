//! HTTP server: the axum edge of the engine.
//!
//! # Responsibilities
//! - Accept every method on every path via two catch-all routes
//! - Buffer the request body (bounded) and shape it for dispatch
//! - Hand dispatch a consistent table snapshot per request
//! - Record per-request metrics and emit traces
//!
//! # Design Decisions
//! - The axum router knows exactly two routes: `/` and `/{*path}`. All real
//!   routing lives in the route table, which can be swapped at runtime
//!   without touching the server.
//! - Each request loads the table snapshot once and dispatches entirely
//!   against it, so a reload mid-request can never mix generations.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::schema::PagetreeConfig;
use crate::handler::api::{self, ScriptRequest};
use crate::handler::loader::HandlerCache;
use crate::http::dispatch;
use crate::observability::metrics;
use crate::routing::table::RouteTable;

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<ArcSwap<RouteTable>>,
    pub handlers: Arc<HandlerCache>,
    pub config: Arc<PagetreeConfig>,
}

pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(
        config: PagetreeConfig,
        table: Arc<ArcSwap<RouteTable>>,
        handlers: Arc<HandlerCache>,
    ) -> Self {
        let state = AppState {
            table,
            handlers,
            config: Arc::new(config),
        };
        Self {
            router: build_router(state),
        }
    }

    /// Serves connections until the shutdown signal fires.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        tracing::info!("HTTP server starting");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);
    Router::new()
        .route("/{*path}", any(route_handler))
        .route("/", any(route_handler))
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
}

async fn route_handler(State(state): State<AppState>, request: Request) -> Response {
    let start = Instant::now();

    // 1. Buffer the request body, bounded by the configured limit
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, state.config.server.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %parts.uri.path(), error = %e, "Failed to buffer request body");
            metrics::record_request(parts.method.as_str(), 413, "body_too_large", start);
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };
    let script_request = script_request(&parts, &bytes);

    // 2. Dispatch against the current table snapshot
    let table = state.table.load();
    let dispatched = dispatch::dispatch(&table, &state.handlers, &script_request);

    // 3. Record and respond
    metrics::record_request(
        &script_request.method,
        dispatched.status(),
        dispatched.outcome.as_str(),
        start,
    );
    metrics::record_handlers_cached(state.handlers.len());
    dispatched.into_response()
}

/// Shapes raw request parts into the value handlers see.
fn script_request(parts: &axum::http::request::Parts, body: &[u8]) -> ScriptRequest {
    let mut request = ScriptRequest::new(parts.method.as_str(), parts.uri.path());
    request.query = parts.uri.query().map(api::parse_query).unwrap_or_default();
    for (name, value) in &parts.headers {
        request.headers.insert(
            name.as_str().to_string(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }
    request.body = String::from_utf8_lossy(body).into_owned();
    request
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    tracing::info!("Shutdown signal received, draining connections");
}
