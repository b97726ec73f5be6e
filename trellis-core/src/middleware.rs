//! # Middleware
//!
//! A middleware is a transform `next -> handler`: it receives the downstream
//! handler and returns a new handler that may
//!
//! - inspect or modify the context before calling `next`,
//! - short-circuit with its own response and never call `next`,
//! - call `next` and post-process the response,
//! - inject typed values into the context for everything downstream.
//!
//! # Ordering
//!
//! A [`Chain`] `[m1, m2, m3]` applied to `h` yields `m1(m2(m3(h)))`: `m1`
//! runs first on the way in and last on the way out.
//!
//! # Writing Middleware
//!
//! Implement [`Middleware`] on a struct for reusable, configurable
//! middleware, or use [`from_fn`] for one-off async logic:
//!
//! ```rust
//! use trellis_core::{Context, Next, from_fn};
//!
//! #[derive(Clone)]
//! struct User(&'static str);
//!
//! let auth = from_fn(|mut ctx: Context, next: Next| async move {
//!     ctx.insert(User("123"));
//!     next.run(ctx).await
//! });
//! # let _ = auth;
//! ```

use crate::{
    context::Context,
    handler::{BoxHandler, Handler},
    response::{IntoResponse, Response},
};
use std::{fmt, future::Future, sync::Arc};

/// Wraps a downstream handler, producing a new handler.
///
/// Wrapping happens once, when a route is registered or mounted; the
/// returned handler is what runs per request.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a trellis `Middleware`",
    label = "missing `Middleware` implementation",
    note = "Implement `Middleware::wrap`, or build one with `trellis_core::from_fn`."
)]
pub trait Middleware: Send + Sync + 'static {
    /// Wrap `next`, returning the handler that runs in its place.
    fn wrap(&self, next: BoxHandler) -> BoxHandler;
}

// Blanket impl for plain transform functions.
impl<F> Middleware for F
where
    F: Fn(BoxHandler) -> BoxHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        (self)(next)
    }
}

/// An ordered middleware list.
///
/// Cloning a chain copies the list of shared middleware, never the
/// middleware themselves, so snapshots are cheap.
#[derive(Clone, Default)]
pub struct Chain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware; it becomes the innermost layer.
    pub fn push<M: Middleware>(&mut self, middleware: M) {
        self.layers.push(Arc::new(middleware));
    }

    /// Append an already shared middleware.
    pub fn push_shared(&mut self, middleware: Arc<dyn Middleware>) {
        self.layers.push(middleware);
    }

    /// Builder form of [`push`](Self::push).
    pub fn with<M: Middleware>(mut self, middleware: M) -> Self {
        self.push(middleware);
        self
    }

    /// Number of middleware in the chain.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True when the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Wrap `handler` so the first middleware is the outermost layer.
    pub fn apply(&self, handler: BoxHandler) -> BoxHandler {
        self.layers
            .iter()
            .rev()
            .fold(handler, |next, middleware| middleware.wrap(next))
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("len", &self.layers.len())
            .finish()
    }
}

// A chain is itself a middleware, so a whole stack can be nested as one layer.
impl Middleware for Chain {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        self.apply(next)
    }
}

/// The downstream part of the chain, as seen by a [`from_fn`] middleware.
#[derive(Clone, Debug)]
pub struct Next {
    handler: BoxHandler,
}

impl Next {
    /// Run the rest of the chain.
    pub async fn run(&self, ctx: Context) -> Response {
        self.handler.call(ctx).await
    }
}

/// Build a middleware from an async function of `(Context, Next)`.
pub fn from_fn<F, Fut, Out>(f: F) -> FromFn<F>
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Out> + Send,
    Out: IntoResponse,
{
    FromFn { f: Arc::new(f) }
}

/// Middleware created by [`from_fn`].
pub struct FromFn<F> {
    f: Arc<F>,
}

impl<F> Clone for FromFn<F> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<F, Fut, Out> Middleware for FromFn<F>
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Out> + Send,
    Out: IntoResponse,
{
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        BoxHandler::new(FromFnHandler {
            f: Arc::clone(&self.f),
            next: Next { handler: next },
        })
    }
}

struct FromFnHandler<F> {
    f: Arc<F>,
    next: Next,
}

impl<F, Fut, Out> Handler for FromFnHandler<F>
where
    F: Fn(Context, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Out> + Send,
    Out: IntoResponse,
{
    fn call(&self, ctx: Context) -> impl Future<Output = Response> + Send {
        let fut = (self.f)(ctx, self.next.clone());
        async move { fut.await.into_response() }
    }
}
