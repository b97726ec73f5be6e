//! # Per-request Context
//!
//! A [`Context`] is created by the transport for every inbound request and
//! moved, by value, through the middleware chain into the handler. Nothing
//! about it is shared between requests.
//!
//! It carries:
//!
//! - the [`Request`] head,
//! - the path [`Params`] extracted by the router,
//! - a typed extension map for values injected by middleware,
//! - an optional cancellation token supplied by the transport.
//!
//! # Scoping
//!
//! Because the context is moved into `next`, a value a middleware inserts
//! before calling `next` is visible to `next` and everything it calls, and to
//! nothing that ran before:
//!
//! ```rust
//! use trellis_core::{Context, Method, Request};
//!
//! #[derive(Clone)]
//! struct UserId(&'static str);
//!
//! let mut ctx = Context::new(Request::new(Method::GET, "/transaction"));
//! assert!(ctx.get::<UserId>().is_none());
//!
//! ctx.insert(UserId("123"));
//! assert_eq!(ctx.get::<UserId>().map(|u| u.0), Some("123"));
//! ```

use crate::request::Request;
use http::{Extensions, HeaderMap, Method};
use tokio_util::sync::CancellationToken;

/// Path parameters bound by a route match, in left-to-right segment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Create an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// The value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Per-request state handed to middleware and handlers.
#[derive(Debug)]
pub struct Context {
    request: Request,
    params: Params,
    extensions: Extensions,
    cancellation: Option<CancellationToken>,
}

impl Context {
    /// Create a context for an inbound request.
    pub fn new(request: Request) -> Self {
        Self {
            request,
            params: Params::new(),
            extensions: Extensions::new(),
            cancellation: None,
        }
    }

    /// Attach the transport's cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The request head.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Mutable access to the request head.
    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// Shorthand for `self.request().method()`.
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// Shorthand for `self.request().path()`.
    pub fn path(&self) -> &str {
        self.request.path()
    }

    /// Shorthand for `self.request().headers()`.
    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// The path parameters bound by the router.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Replace the path parameters. Called by the router before dispatch.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// Shorthand for `self.params().get(name)`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Insert a typed value, returning the value it replaced.
    pub fn insert<T>(&mut self, value: T) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.extensions.insert(value)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with<T>(mut self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.extensions.insert(value);
        self
    }

    /// The value of type `T`, if some upstream code inserted one.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    /// Remove and return the value of type `T`.
    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions.remove::<T>()
    }

    /// The raw extension map.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Mutable access to the raw extension map.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// The cancellation token, if the transport attached one.
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    /// Replace the cancellation token (e.g. with a child token).
    pub fn set_cancellation(&mut self, token: CancellationToken) {
        self.cancellation = Some(token);
    }

    /// True once the request has been cancelled. Advisory only.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Resolves when the request is cancelled. Never resolves without a token.
    pub async fn cancelled(&self) {
        match &self.cancellation {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    }
}
