//! Script handlers: compilation, caching, and the API handlers program
//! against.
//!
//! # Data Flow
//!
//! ```text
//! dispatch ──> loader::HandlerCache::load (fingerprint hit or compile)
//!          ──> HandlerModule::invoke(method, request map, ctx map)
//!          ──> api::decode_response ──> HandlerResponse
//! ```

pub mod api;
pub mod loader;

pub use api::{HandlerResponse, ScriptRequest};
pub use loader::{HandlerCache, HandlerError, HandlerModule};
