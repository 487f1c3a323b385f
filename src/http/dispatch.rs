//! Request dispatch: decides, per request, between invoking a handler
//! function and rendering a page.
//!
//! # Data Flow
//!
//! ```text
//! request ──> 1. match route (first match wins)
//!         ──> 2. load handler (fingerprint cache, lazy compile)
//!         ──> 3. decide
//!                ├─ handler function, unless a page owns GET
//!                ├─ empty module + no page        → configuration error
//!                ├─ page + GET (optional shaping) → rendered html
//!                └─ otherwise                     → not found
//! ```
//!
//! # Design Decisions
//! - Handler functions run synchronously on the request task. Handlers are
//!   expected to be short-lived glue code; the request timeout still bounds
//!   the connection.
//! - A route with both a page and a handler gives GET to the page. The
//!   handler still participates: its JSON body feeds `{{key}}` placeholders
//!   in the rendered page. Every other method goes to the handler.
//! - Handler failures are contained per request: a broken load degrades to
//!   the page or 404, a failed call returns 500 with the error text, and a
//!   failed shaping step serves the unsubstituted page.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::handler::api::{self, HandlerResponse, ScriptRequest};
use crate::handler::loader::{HandlerCache, HandlerError, HandlerModule};
use crate::render::compose;
use crate::routing::params;
use crate::routing::route::Route;
use crate::routing::table::RouteTable;

/// The one method a page can answer by itself.
const PAGE_METHOD: &str = "GET";

/// How a dispatch concluded. The label feeds request metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handler,
    Page,
    NotFound,
    HandlerError,
    ConfigError,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Handler => "handler",
            Outcome::Page => "page",
            Outcome::NotFound => "not_found",
            Outcome::HandlerError => "handler_error",
            Outcome::ConfigError => "config_error",
        }
    }
}

/// Result of dispatching one request.
#[derive(Debug)]
pub struct Dispatched {
    pub response: HandlerResponse,
    pub outcome: Outcome,
}

impl Dispatched {
    fn not_found() -> Self {
        Self {
            response: HandlerResponse::plain(404, "Not found"),
            outcome: Outcome::NotFound,
        }
    }

    fn handler_error(message: String) -> Self {
        Self {
            response: HandlerResponse::plain(500, message),
            outcome: Outcome::HandlerError,
        }
    }

    fn config_error(message: &str) -> Self {
        Self {
            response: HandlerResponse::plain(500, message),
            outcome: Outcome::ConfigError,
        }
    }

    fn page(body: String) -> Self {
        Self {
            response: HandlerResponse::html(200, body),
            outcome: Outcome::Page,
        }
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }
}

#[derive(Debug, Error)]
enum ShapeError {
    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error("handler body is not JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Dispatches one request against a table snapshot.
pub fn dispatch(table: &RouteTable, handlers: &HandlerCache, request: &ScriptRequest) -> Dispatched {
    // 1. Match route
    let Some(route) = table.match_path(&request.path) else {
        tracing::debug!(method = %request.method, path = %request.path, "No route matched");
        return Dispatched::not_found();
    };
    let params = params::bound_params(&request.path, &route.path);
    tracing::debug!(
        method = %request.method,
        path = %request.path,
        route = %route.path,
        "Route matched"
    );

    // 2. Load handler
    let module = load_module(handlers, route);

    // 3. Decide. A handler function answers every method except a GET that
    //    a page claims.
    if let Some(module) = module.as_ref().filter(|m| m.has_method(&request.method)) {
        if !route.has_page() || request.method != PAGE_METHOD {
            return invoke_handler(handlers, module, route, request, &params);
        }
    }

    // A module that loaded with no public functions at all, on a route with
    // no page to fall back to, is a configuration error rather than a miss.
    if let Some(module) = &module {
        if module.is_empty() && !route.has_page() {
            tracing::error!(route = %route.path, file = ?route.source_path, "Handler module is empty");
            return Dispatched::config_error("Handler module is empty");
        }
    }

    if route.has_page() && request.method == PAGE_METHOD {
        return render_page(table, handlers, module.as_deref(), route, request, &params);
    }

    tracing::debug!(method = %request.method, route = %route.path, "No handler or page applies");
    Dispatched::not_found()
}

fn load_module(handlers: &HandlerCache, route: &Route) -> Option<Arc<HandlerModule>> {
    let (source, fingerprint) = match (&route.handler_source, route.fingerprint) {
        (Some(source), Some(fingerprint)) => (source, fingerprint),
        _ => return None,
    };
    match handlers.load(fingerprint, source) {
        Ok(module) => Some(module),
        Err(e) => {
            tracing::warn!(
                route = %route.path,
                file = ?route.source_path,
                error = %e,
                "Handler failed to load"
            );
            None
        }
    }
}

fn invoke_handler(
    handlers: &HandlerCache,
    module: &HandlerModule,
    route: &Route,
    request: &ScriptRequest,
    params: &HashMap<String, String>,
) -> Dispatched {
    let result = module
        .invoke(
            handlers.engine(),
            &request.method,
            request.to_request_map(),
            api::context_map(params),
        )
        .and_then(|value| api::decode_response(value).map_err(HandlerError::from));
    match result {
        Ok(response) => {
            tracing::debug!(route = %route.path, status = response.status, "Handler responded");
            Dispatched {
                response,
                outcome: Outcome::Handler,
            }
        }
        Err(e) => {
            tracing::error!(
                route = %route.path,
                method = %request.method,
                error = %e,
                "Handler failed"
            );
            Dispatched::handler_error(e.to_string())
        }
    }
}

fn render_page(
    table: &RouteTable,
    handlers: &HandlerCache,
    module: Option<&HandlerModule>,
    route: &Route,
    request: &ScriptRequest,
    params: &HashMap<String, String>,
) -> Dispatched {
    let page = route.page.as_deref().unwrap_or_default();
    let mut body = compose::compose(page, &route.layouts, table.document());

    // Data shaping: a GET handler next to the page feeds its JSON body into
    // `{{key}}` placeholders. Failures keep the unsubstituted page.
    if let Some(module) = module.filter(|m| m.has_method(&request.method)) {
        match shape_data(handlers, module, request, params) {
            Ok(data) => body = compose::substitute(&body, &data),
            Err(e) => {
                tracing::warn!(route = %route.path, error = %e, "Page data shaping failed");
            }
        }
    }

    tracing::debug!(route = %route.path, bytes = body.len(), "Page rendered");
    Dispatched::page(body)
}

fn shape_data(
    handlers: &HandlerCache,
    module: &HandlerModule,
    request: &ScriptRequest,
    params: &HashMap<String, String>,
) -> Result<serde_json::Value, ShapeError> {
    let value = module.invoke(
        handlers.engine(),
        &request.method,
        request.to_request_map(),
        api::context_map(params),
    )?;
    let response = api::decode_response(value).map_err(HandlerError::from)?;
    Ok(serde_json::from_str(&response.body)?)
}

impl IntoResponse for Dispatched {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, self.response.content_type.as_str())
            .body(Body::from(self.response.body))
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to build response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            });
        for (name, value) in &self.response.headers {
            let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
                tracing::warn!(header = %name, "Dropping invalid response header name");
                continue;
            };
            let Ok(value) = HeaderValue::from_str(value) else {
                tracing::warn!(header = %name, "Dropping invalid response header value");
                continue;
            };
            response.headers_mut().append(name, value);
        }
        response
    }
}
