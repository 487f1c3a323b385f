//! Script-facing API: the values handlers receive and the responses they
//! can build.
//!
//! # Responsibilities
//! - Shape an incoming HTTP request into the plain `request` map handed to
//!   handler functions (method, path, query, headers, body, form)
//! - Shape matched path parameters into the `ctx` map
//! - Register the `Response` type and its constructors on the script engine
//! - Decode whatever a handler returned into a concrete [`HandlerResponse`]
//!
//! # Design Decisions
//! - Handlers see plain maps, not engine-registered request types. Maps keep
//!   the script surface small and make handlers trivially testable.
//! - Return conventions are forgiving: a bare string becomes `200
//!   text/plain`, a bare map or array becomes `200 application/json`, unit
//!   becomes `204`, and anything else is stringified. Full control requires
//!   the `Response` constructors.

use std::collections::HashMap;

use rhai::{Dynamic, Engine, EvalAltResult, Map};

/// Request data exposed to handler functions.
///
/// Built once per dispatch from the raw HTTP request. Header names are
/// lowercase; query and form values are percent-decoded.
#[derive(Debug, Clone, Default)]
pub struct ScriptRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ScriptRequest {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            ..Self::default()
        }
    }

    /// Shorthand used heavily in tests.
    pub fn get(path: &str) -> Self {
        Self::new("GET", path)
    }

    /// Builds the `request` map a handler function receives.
    pub fn to_request_map(&self) -> Map {
        let mut map = Map::new();
        map.insert("method".into(), self.method.clone().into());
        map.insert("path".into(), self.path.clone().into());
        map.insert("query".into(), string_map(&self.query).into());
        map.insert("headers".into(), string_map(&self.headers).into());
        map.insert("body".into(), self.body.clone().into());
        map.insert("form".into(), string_map(&self.form()).into());
        map
    }

    /// Parses the body as a form when the request was urlencoded.
    pub fn form(&self) -> HashMap<String, String> {
        let urlencoded = self
            .headers
            .get("content-type")
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);
        if urlencoded {
            parse_query(&self.body)
        } else {
            HashMap::new()
        }
    }
}

/// Decodes a query string (or urlencoded form body) into a map.
///
/// Percent-encoding and `+` are decoded. Repeated keys keep the last value.
pub fn parse_query(raw: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Builds the `ctx` map a handler function receives.
pub fn context_map(params: &HashMap<String, String>) -> Map {
    let mut map = Map::new();
    map.insert("params".into(), string_map(params).into());
    map
}

fn string_map(values: &HashMap<String, String>) -> Map {
    values
        .iter()
        .map(|(k, v)| (k.as_str().into(), Dynamic::from(v.clone())))
        .collect()
}

/// Response built by a handler, registered with scripts as `Response`.
#[derive(Debug, Clone)]
pub struct ScriptResponse {
    pub status: u16,
    pub content_type: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ScriptResponse {
    fn new(status: u16, content_type: &str, body: String) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn text(body: &str) -> Self {
        Self::new(200, "text/plain; charset=utf-8", body.to_string())
    }

    pub fn html(body: &str) -> Self {
        Self::new(200, "text/html; charset=utf-8", body.to_string())
    }

    pub fn json(value: &serde_json::Value) -> Self {
        Self::new(200, "application/json", value.to_string())
    }

    pub fn redirect(location: &str) -> Self {
        let mut response = Self::new(302, "text/plain; charset=utf-8", String::new());
        response
            .headers
            .push(("location".to_string(), location.to_string()));
        response
    }
}

/// Concrete response handed back to the dispatcher.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    pub status: u16,
    pub content_type: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HandlerResponse {
    pub fn plain(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8".to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8".to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

impl From<ScriptResponse> for HandlerResponse {
    fn from(response: ScriptResponse) -> Self {
        Self {
            status: response.status,
            content_type: response.content_type,
            headers: response.headers,
            body: response.body,
        }
    }
}

/// Decodes the raw value a handler function returned.
pub fn decode_response(value: Dynamic) -> Result<HandlerResponse, Box<EvalAltResult>> {
    if value.is_unit() {
        return Ok(HandlerResponse {
            status: 204,
            content_type: "text/plain; charset=utf-8".to_string(),
            headers: Vec::new(),
            body: String::new(),
        });
    }
    if value.is::<ScriptResponse>() {
        return Ok(value.cast::<ScriptResponse>().into());
    }
    if value.is_string() {
        let body = value.into_string().unwrap_or_default();
        return Ok(HandlerResponse::plain(200, body));
    }
    if value.is_map() || value.is_array() {
        let json = rhai::serde::from_dynamic::<serde_json::Value>(&value)?;
        return Ok(HandlerResponse {
            status: 200,
            content_type: "application/json".to_string(),
            headers: Vec::new(),
            body: json.to_string(),
        });
    }
    Ok(HandlerResponse::plain(200, value.to_string()))
}

/// Registers the script surface on an engine: the `Response` type, its
/// constructors, and print hooks routed into the log.
pub fn register_api(engine: &mut Engine) {
    engine.register_type_with_name::<ScriptResponse>("Response");

    engine.register_fn("text", |body: &str| ScriptResponse::text(body));
    engine.register_fn("html", |body: &str| ScriptResponse::html(body));
    engine.register_fn(
        "json",
        |value: Dynamic| -> Result<ScriptResponse, Box<EvalAltResult>> {
            let json = rhai::serde::from_dynamic::<serde_json::Value>(&value)?;
            Ok(ScriptResponse::json(&json))
        },
    );
    engine.register_fn("redirect", |location: &str| ScriptResponse::redirect(location));

    engine.register_fn("with_status", |mut response: ScriptResponse, status: i64| {
        if (100..=599).contains(&status) {
            response.status = status as u16;
        }
        response
    });
    engine.register_fn(
        "with_header",
        |mut response: ScriptResponse, name: &str, value: &str| {
            response
                .headers
                .push((name.to_ascii_lowercase(), value.to_string()));
            response
        },
    );

    engine.on_print(|message| tracing::info!(target: "pagetree::script", "{message}"));
    engine.on_debug(|message, _source, position| {
        tracing::debug!(target: "pagetree::script", ?position, "{message}");
    });
}
