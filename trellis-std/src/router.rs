//! The public router.
//!
//! A [`Router`] is built once, on one thread, through `&mut self` calls, then
//! shared read-only (usually in an `Arc`) by every request task. Nothing on
//! the dispatch path takes a lock.
//!
//! # Middleware scoping
//!
//! Every route captures the middleware chain as it stands when the route is
//! registered. [`Router::use_middleware`] therefore only affects routes
//! declared after it, and [`Router::group`] restores the chain when its
//! closure returns, so middleware added inside a group never reaches the
//! group's siblings.
//!
//! # Mounting
//!
//! [`Router::mount`] grafts every route of an independently built router
//! under a prefix, wrapping each one in the parent's chain as it stands at the
//! mount point. A request to a mounted route runs
//! `[parent chain] → [sub-router chain] → handler`. The composition is done
//! once, at mount time.
//!
//! Mounted routes keep the options of the router that declared them
//! (parameter decoding, `HEAD` falling back to `GET`). Custom fallbacks set
//! on the mounted router answer unmatched requests under its prefix; when
//! several mounted scopes match, the longest prefix wins.
//!
//! ```rust
//! use trellis_std::Router;
//! use trellis_core::{Context, RouteError};
//!
//! fn build() -> Result<Router, RouteError> {
//!     let mut blog = Router::new();
//!     blog.get("/article/{article_id}", |ctx: Context| async move {
//!         format!("article {}", ctx.param("article_id").unwrap_or_default())
//!     })?;
//!
//!     let mut root = Router::new();
//!     root.get("/", |_ctx: Context| async { "Hello World!" })?;
//!     root.mount("/api", blog)?;
//!     Ok(root)
//! }
//! # build().unwrap();
//! ```

use crate::{
    config::RouterConfig,
    pattern::{self, CompiledPattern},
    tree::{Entry, Lookup, RouteTable},
};
use http::{HeaderValue, Method, StatusCode, header};
use std::fmt;
use tracing::{debug, trace};
use trellis_core::{
    BoxHandler, Chain, Context, Handler, Middleware, Request, Response, RouteError,
};

/// Methods that would have matched, attached to the context handed to the
/// method-not-allowed handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedMethods(pub Vec<Method>);

impl fmt::Display for AllowedMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, method) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(method.as_str())?;
        }
        Ok(())
    }
}

async fn default_not_found(_ctx: Context) -> Response {
    Response::text(StatusCode::NOT_FOUND, "404 page not found")
}

async fn default_method_not_allowed(ctx: Context) -> Response {
    let mut response = Response::new(StatusCode::METHOD_NOT_ALLOWED);
    if let Some(allowed) = ctx.get::<AllowedMethods>() {
        if let Ok(value) = HeaderValue::from_str(&allowed.to_string()) {
            response.headers_mut().insert(header::ALLOW, value);
        }
    }
    response
}

/// A registered route.
struct Route {
    /// Already wrapped in every chain it runs under.
    handler: BoxHandler,
    head_falls_back_to_get: bool,
}

#[derive(Debug, Clone, Copy)]
enum FallbackKind {
    NotFound,
    MethodNotAllowed,
}

/// Fallbacks grafted from a mounted router, already wrapped in both chains.
struct ScopedFallbacks {
    prefix: CompiledPattern,
    not_found: Option<BoxHandler>,
    method_not_allowed: Option<BoxHandler>,
}

impl ScopedFallbacks {
    fn get(&self, kind: FallbackKind) -> Option<&BoxHandler> {
        match kind {
            FallbackKind::NotFound => self.not_found.as_ref(),
            FallbackKind::MethodNotAllowed => self.method_not_allowed.as_ref(),
        }
    }
}

/// Custom fallback handlers as given, plus the effective ones wrapped in the
/// router's full chain.
struct Fallbacks {
    not_found: Option<BoxHandler>,
    method_not_allowed: Option<BoxHandler>,
    wrapped_not_found: BoxHandler,
    wrapped_method_not_allowed: BoxHandler,
    scoped: Vec<ScopedFallbacks>,
}

impl Fallbacks {
    fn new() -> Self {
        Self {
            not_found: None,
            method_not_allowed: None,
            wrapped_not_found: BoxHandler::new(default_not_found),
            wrapped_method_not_allowed: BoxHandler::new(default_method_not_allowed),
            scoped: Vec::new(),
        }
    }

    fn rewrap(&mut self, chain: &Chain) {
        let not_found = self
            .not_found
            .clone()
            .unwrap_or_else(|| BoxHandler::new(default_not_found));
        let method_not_allowed = self
            .method_not_allowed
            .clone()
            .unwrap_or_else(|| BoxHandler::new(default_method_not_allowed));
        self.wrapped_not_found = chain.apply(not_found);
        self.wrapped_method_not_allowed = chain.apply(method_not_allowed);
    }

    fn wrapped(&self, kind: FallbackKind) -> &BoxHandler {
        match kind {
            FallbackKind::NotFound => &self.wrapped_not_found,
            FallbackKind::MethodNotAllowed => &self.wrapped_method_not_allowed,
        }
    }
}

/// An HTTP request router.
pub struct Router {
    table: RouteTable<Route>,
    chain: Chain,
    config: RouterConfig,
    fallbacks: Fallbacks,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! method_shorthands {
    ($($(#[$meta:meta])* $name:ident => $method:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name<H: Handler>(
                &mut self,
                pattern: &str,
                handler: H,
            ) -> Result<&mut Self, RouteError> {
                self.on(Method::$method, pattern, handler)
            }
        )+
    };
}

impl Router {
    /// Create an empty router with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create an empty router.
    pub fn with_config(config: RouterConfig) -> Self {
        let mut table = RouteTable::new();
        table.set_decode_params(config.decodes_params());
        Self {
            table,
            chain: Chain::new(),
            config,
            fallbacks: Fallbacks::new(),
        }
    }

    /// The router's configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Register `handler` for `method` and `pattern`.
    ///
    /// The handler is wrapped in the middleware chain as it stands now.
    /// Fails if the pattern does not compile or clashes with an existing
    /// route; the error names the pattern.
    pub fn on<H: Handler>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, RouteError> {
        let compiled = pattern::compile(pattern)?;
        debug!(
            %method,
            pattern = %compiled,
            middleware = self.chain.len(),
            "registering route"
        );
        let route = Route {
            handler: self.chain.apply(BoxHandler::new(handler)),
            head_falls_back_to_get: self.config.heads_fall_back_to_get(),
        };
        self.table.insert(method, compiled, route)?;
        Ok(self)
    }

    method_shorthands! {
        /// Register a `GET` route.
        get => GET,
        /// Register a `HEAD` route.
        head => HEAD,
        /// Register a `POST` route.
        post => POST,
        /// Register a `PUT` route.
        put => PUT,
        /// Register a `PATCH` route.
        patch => PATCH,
        /// Register a `DELETE` route.
        delete => DELETE,
        /// Register an `OPTIONS` route.
        options => OPTIONS,
        /// Register a `CONNECT` route.
        connect => CONNECT,
        /// Register a `TRACE` route.
        trace => TRACE,
    }

    /// Append a middleware to this scope's chain.
    ///
    /// Only routes registered after this call are wrapped. The not-found and
    /// method-not-allowed fallbacks always run inside the full chain.
    pub fn use_middleware<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.chain.push(middleware);
        self.fallbacks.rewrap(&self.chain);
        self
    }

    /// Run `f` in a child scope that starts from the current chain.
    ///
    /// Middleware added inside `f` applies to routes registered inside `f`
    /// only. Paths are not prefixed.
    pub fn group<F>(&mut self, f: F) -> Result<&mut Self, RouteError>
    where
        F: FnOnce(&mut Router) -> Result<(), RouteError>,
    {
        let snapshot = self.chain.clone();
        let result = f(self);
        self.chain = snapshot;
        self.fallbacks.rewrap(&self.chain);
        result.map(|()| self)
    }

    /// Build a sub-router with `f` and mount it under `prefix`.
    ///
    /// The sub-router starts with an empty chain of its own; the current
    /// chain of `self` is applied on top when it is mounted.
    pub fn route<F>(&mut self, prefix: &str, f: F) -> Result<&mut Self, RouteError>
    where
        F: FnOnce(&mut Router) -> Result<(), RouteError>,
    {
        let mut sub = Router::with_config(self.config.clone());
        f(&mut sub)?;
        self.mount(prefix, sub)
    }

    /// Graft every route of `router` under `prefix`.
    ///
    /// Each route keeps the options `router` was configured with. Custom
    /// fallbacks set on `router` handle unmatched requests under `prefix`;
    /// otherwise those reach this router's fallbacks.
    pub fn mount(&mut self, prefix: &str, router: Router) -> Result<&mut Self, RouteError> {
        let prefix = pattern::compile(prefix)?;
        if prefix.has_wildcard() {
            return Err(RouteError::InvalidMountPrefix(prefix.to_string()));
        }

        let entries = router.table.into_entries();
        debug!(
            prefix = %prefix,
            routes = entries.len(),
            middleware = self.chain.len(),
            "mounting router"
        );

        for Entry {
            method,
            pattern,
            value,
            decode_params,
        } in entries
        {
            self.table.insert_entry(Entry {
                method,
                pattern: prefix.join(&pattern)?,
                value: Route {
                    handler: self.chain.apply(value.handler),
                    head_falls_back_to_get: value.head_falls_back_to_get,
                },
                decode_params,
            })?;
        }

        let Fallbacks {
            not_found,
            method_not_allowed,
            wrapped_not_found,
            wrapped_method_not_allowed,
            scoped,
        } = router.fallbacks;
        for nested in scoped {
            self.fallbacks.scoped.push(ScopedFallbacks {
                prefix: prefix.join(&nested.prefix)?,
                not_found: nested.not_found.map(|h| self.chain.apply(h)),
                method_not_allowed: nested.method_not_allowed.map(|h| self.chain.apply(h)),
            });
        }
        if not_found.is_some() || method_not_allowed.is_some() {
            self.fallbacks.scoped.push(ScopedFallbacks {
                prefix,
                not_found: not_found.map(|_| self.chain.apply(wrapped_not_found)),
                method_not_allowed: method_not_allowed
                    .map(|_| self.chain.apply(wrapped_method_not_allowed)),
            });
        }
        Ok(self)
    }

    /// Replace the handler for requests no route matches.
    pub fn not_found<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.fallbacks.not_found = Some(BoxHandler::new(handler));
        self.fallbacks.rewrap(&self.chain);
        self
    }

    /// Replace the handler for paths that match under other methods only.
    ///
    /// The context carries an [`AllowedMethods`] extension.
    pub fn method_not_allowed<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.fallbacks.method_not_allowed = Some(BoxHandler::new(handler));
        self.fallbacks.rewrap(&self.chain);
        self
    }

    /// Registered routes, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &CompiledPattern)> {
        self.table.routes()
    }

    /// The routing decision for `method` and `path`, without running anything.
    ///
    /// A query string in `path` is ignored.
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, BoxHandler> {
        let path = path.split_once('?').map_or(path, |(path, _)| path);
        self.resolve(method, path).0.map(|route| &route.handler)
    }

    /// Dispatch one request.
    ///
    /// Runs the matched route (with its parameters attached to `ctx`), or
    /// the not-found / method-not-allowed fallback.
    pub async fn handle(&self, mut ctx: Context) -> Response {
        let (lookup, head_as_get) = self.resolve(ctx.method(), ctx.path());

        match lookup {
            Lookup::Found { value, params } => {
                trace!(method = %ctx.method(), path = ctx.path(), params = params.len(), "route matched");
                ctx.set_params(params);
                let mut response = value.handler.call(ctx).await;
                if head_as_get {
                    response.body_mut().clear();
                }
                response
            }
            Lookup::MethodNotAllowed { allowed } => {
                trace!(method = %ctx.method(), path = ctx.path(), ?allowed, "method not allowed");
                let fallback = self.fallback(FallbackKind::MethodNotAllowed, ctx.path());
                ctx.insert(AllowedMethods(allowed));
                fallback.call(ctx).await
            }
            Lookup::NotFound => {
                trace!(method = %ctx.method(), path = ctx.path(), "no route");
                self.fallback(FallbackKind::NotFound, ctx.path()).call(ctx).await
            }
        }
    }

    /// Dispatch a bare `method` + `path` request with a fresh context.
    pub async fn call(&self, method: Method, path: &str) -> Response {
        self.handle(Context::new(Request::new(method, path))).await
    }

    /// The fallback of the longest mounted prefix covering `path`, or this
    /// router's own.
    fn fallback(&self, kind: FallbackKind, path: &str) -> &BoxHandler {
        self.fallbacks
            .scoped
            .iter()
            .filter(|scope| scope.prefix.matches_prefix(path))
            .filter_map(|scope| Some((scope.prefix.segments().len(), scope.get(kind)?)))
            .max_by_key(|(depth, _)| *depth)
            .map_or_else(|| self.fallbacks.wrapped(kind), |(_, handler)| handler)
    }

    /// Look up a route, letting a `GET` route answer `HEAD` when it was
    /// declared with that option. The flag is set when it did.
    fn resolve(&self, method: &Method, path: &str) -> (Lookup<'_, Route>, bool) {
        let lookup = self.table.lookup(method, path);
        let mut allowed = match lookup {
            Lookup::MethodNotAllowed { allowed } => allowed,
            other => return (other, false),
        };
        if allowed.contains(&Method::GET) {
            let get = self.table.lookup(&Method::GET, path);
            if matches!(&get, Lookup::Found { value, .. } if value.head_falls_back_to_get) {
                if *method == Method::HEAD {
                    return (get, true);
                }
                if !allowed.contains(&Method::HEAD) {
                    allowed.push(Method::HEAD);
                    allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                }
            }
        }
        (Lookup::MethodNotAllowed { allowed }, false)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field(
                "routes",
                &self
                    .routes()
                    .map(|(method, pattern)| format!("{method} {pattern}"))
                    .collect::<Vec<_>>(),
            )
            .field("middleware", &self.chain.len())
            .field("config", &self.config)
            .finish()
    }
}
