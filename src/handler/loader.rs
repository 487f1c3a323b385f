//! Handler compilation and the fingerprint-keyed module cache.
//!
//! # Responsibilities
//! - Compile handler source into reusable modules on first dispatch
//! - Cache compiled modules by content fingerprint so identical source is
//!   compiled exactly once, across routes and across table rebuilds
//! - Invoke a module's method function with the request and ctx maps
//!
//! # Design Decisions
//! - The cache key is a hash of the source text, not the file path. Editing
//!   a handler changes its fingerprint, so a rebuilt route table naturally
//!   picks up fresh compilations while untouched handlers stay warm.
//! - One engine is shared by every handler. It is configured once at
//!   startup and never mutated afterwards, which keeps concurrent dispatch
//!   free of locks around script execution.
//! - Compilation failures are not cached. A broken handler is re-tried on
//!   the next request, so fixing the file (in dev mode) heals the route
//!   without a restart.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::DashMap;
use rhai::{Dynamic, Engine, FnAccess, Map, Scope, AST};
use thiserror::Error;

use super::api;

/// Function names recognized as HTTP method handlers.
pub const HTTP_METHODS: [&str; 7] = [
    "GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "HEAD",
];

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("handler failed to compile: {0}")]
    Compile(#[from] rhai::ParseError),

    #[error("handler call failed: {0}")]
    Call(#[from] Box<rhai::EvalAltResult>),

    #[error("handler exposes no {0} function")]
    MissingMethod(String),
}

/// Stable fingerprint of handler source text.
pub fn fingerprint(source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    hasher.finish()
}

/// A compiled handler: the AST plus an index of its method functions.
#[derive(Debug)]
pub struct HandlerModule {
    ast: AST,
    methods: HashMap<String, usize>,
    public_fns: usize,
}

impl HandlerModule {
    fn compile(engine: &Engine, source: &str) -> Result<Self, HandlerError> {
        let ast = engine.compile(source)?;
        let mut methods = HashMap::new();
        let mut public_fns = 0;
        for function in ast.iter_functions() {
            if function.access != FnAccess::Public {
                continue;
            }
            public_fns += 1;
            if HTTP_METHODS.contains(&function.name) {
                let arity = methods.entry(function.name.to_string()).or_insert(0);
                *arity = (*arity).max(function.params.len());
            }
        }
        Ok(Self {
            ast,
            methods,
            public_fns,
        })
    }

    /// True when the script defines no public functions at all.
    pub fn is_empty(&self) -> bool {
        self.public_fns == 0
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Method names the module exposes, sorted for stable logging.
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Calls the method function for `method` with the request and ctx maps.
    ///
    /// Arguments are fitted to the function's declared arity: a handler may
    /// take fewer than two parameters, and extra declared parameters receive
    /// unit.
    pub fn invoke(
        &self,
        engine: &Engine,
        method: &str,
        request: Map,
        ctx: Map,
    ) -> Result<Dynamic, HandlerError> {
        let arity = *self
            .methods
            .get(method)
            .ok_or_else(|| HandlerError::MissingMethod(method.to_string()))?;
        let mut args: Vec<Dynamic> = vec![Dynamic::from(request), Dynamic::from(ctx)];
        args.truncate(arity);
        while args.len() < arity {
            args.push(Dynamic::UNIT);
        }
        let mut scope = Scope::new();
        Ok(engine.call_fn::<Dynamic>(&mut scope, &self.ast, method, args)?)
    }
}

/// Shared engine plus the fingerprint-keyed cache of compiled modules.
pub struct HandlerCache {
    engine: Engine,
    modules: DashMap<u64, Arc<HandlerModule>>,
}

impl HandlerCache {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        api::register_api(&mut engine);
        Self {
            engine,
            modules: DashMap::new(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Returns the compiled module for `source`, compiling on first sight.
    pub fn load(&self, fingerprint: u64, source: &str) -> Result<Arc<HandlerModule>, HandlerError> {
        if let Some(cached) = self.modules.get(&fingerprint) {
            return Ok(cached.value().clone());
        }
        let module = Arc::new(HandlerModule::compile(&self.engine, source)?);
        tracing::debug!(fingerprint, methods = ?module.methods(), "Handler compiled");
        self.modules.insert(fingerprint, module.clone());
        Ok(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for HandlerCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(cache: &HandlerCache, source: &str) -> Arc<HandlerModule> {
        cache.load(fingerprint(source), source).unwrap()
    }

    #[test]
    fn test_compile_indexes_method_functions() {
        let cache = HandlerCache::new();
        let module = load(&cache, "fn GET(request, ctx) { 1 }\nfn POST(request, ctx) { 2 }");
        assert!(module.has_method("GET"));
        assert!(module.has_method("POST"));
        assert!(!module.has_method("DELETE"));
        assert_eq!(module.methods(), ["GET", "POST"]);
        assert!(!module.is_empty());
    }

    #[test]
    fn test_empty_source_is_empty_module() {
        let cache = HandlerCache::new();
        let module = load(&cache, "");
        assert!(module.is_empty());
        assert!(!module.has_method("GET"));
    }

    #[test]
    fn test_helper_only_module_is_not_empty() {
        let cache = HandlerCache::new();
        let module = load(&cache, "fn helper() { 1 }");
        assert!(!module.is_empty());
        assert!(!module.has_method("GET"));
    }

    #[test]
    fn test_private_functions_are_invisible() {
        let cache = HandlerCache::new();
        let module = load(&cache, "private fn GET(request, ctx) { 1 }");
        assert!(module.is_empty());
        assert!(!module.has_method("GET"));
    }

    #[test]
    fn test_invoke_passes_request_and_ctx() {
        let cache = HandlerCache::new();
        let module = load(&cache, r#"fn GET(request, ctx) { request.path + ":" + ctx.params.id }"#);

        let mut request = Map::new();
        request.insert("path".into(), Dynamic::from("/users/42".to_string()));
        let mut params = Map::new();
        params.insert("id".into(), Dynamic::from("42".to_string()));
        let mut ctx = Map::new();
        ctx.insert("params".into(), Dynamic::from(params));

        let result = module.invoke(cache.engine(), "GET", request, ctx).unwrap();
        assert_eq!(result.into_string().unwrap(), "/users/42:42");
    }

    #[test]
    fn test_invoke_fits_arity() {
        let cache = HandlerCache::new();
        let zero = load(&cache, r#"fn GET() { "none" }"#);
        let result = zero
            .invoke(cache.engine(), "GET", Map::new(), Map::new())
            .unwrap();
        assert_eq!(result.into_string().unwrap(), "none");

        let three = load(&cache, r#"fn GET(request, ctx, extra) { if extra == () { "unit" } else { "set" } }"#);
        let result = three
            .invoke(cache.engine(), "GET", Map::new(), Map::new())
            .unwrap();
        assert_eq!(result.into_string().unwrap(), "unit");
    }

    #[test]
    fn test_invoke_missing_method_is_an_error() {
        let cache = HandlerCache::new();
        let module = load(&cache, "fn GET(request, ctx) { 1 }");
        let err = module
            .invoke(cache.engine(), "POST", Map::new(), Map::new())
            .unwrap_err();
        assert!(matches!(err, HandlerError::MissingMethod(_)));
    }

    #[test]
    fn test_script_errors_surface_as_call_errors() {
        let cache = HandlerCache::new();
        let module = load(&cache, r#"fn GET(request, ctx) { throw "boom" }"#);
        let err = module
            .invoke(cache.engine(), "GET", Map::new(), Map::new())
            .unwrap_err();
        assert!(matches!(err, HandlerError::Call(_)));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_compile_error_reported_not_cached() {
        let cache = HandlerCache::new();
        let broken = "fn GET(request, ctx {";
        assert!(matches!(
            cache.load(fingerprint(broken), broken),
            Err(HandlerError::Compile(_))
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_returns_same_module_for_same_fingerprint() {
        let cache = HandlerCache::new();
        let source = "fn GET(request, ctx) { 1 }";
        let first = load(&cache, source);
        let second = load(&cache, source);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        assert_eq!(fingerprint("a"), fingerprint("a"));
        assert_ne!(fingerprint("a"), fingerprint("b"));
    }

    #[test]
    fn test_methods_may_call_helper_functions() {
        let cache = HandlerCache::new();
        let module = load(
            &cache,
            "fn greet(name) { \"hi \" + name }\nfn GET(request, ctx) { greet(\"there\") }",
        );
        let result = module
            .invoke(cache.engine(), "GET", Map::new(), Map::new())
            .unwrap();
        assert_eq!(result.into_string().unwrap(), "hi there");
    }
}
