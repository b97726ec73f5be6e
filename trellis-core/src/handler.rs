//! # Handler
//!
//! The terminal endpoint of a request: given a [`Context`], produce a
//! [`Response`]. The router treats handlers as opaque.
//!
//! # Usage Patterns
//!
//! 1. **Async closure**: `|ctx: Context| async move { "Hello World!" }`
//! 2. **Struct implementation**: `impl Handler for MyHandler`
//! 3. **Type-erased**: [`BoxHandler`], what route tables and middleware pass around

use crate::{
    context::Context,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use std::{fmt, future::Future, sync::Arc};

/// The terminal endpoint of a dispatch.
///
/// This trait uses native `async fn` for zero-cost static dispatch.
/// For dynamic dispatch, use [`DynHandler`] or [`BoxHandler`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a trellis `Handler`",
    label = "missing `Handler` implementation",
    note = "Use an async closure `|ctx: Context| async move {{ .. }}` returning an `IntoResponse`, or implement `Handler`."
)]
pub trait Handler: Send + Sync + 'static {
    /// Handle one request.
    fn call(&self, ctx: Context) -> impl Future<Output = Response> + Send;
}

// Blanket impl for closures
impl<F, Fut, Out> Handler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Out> + Send,
    Out: IntoResponse,
{
    fn call(&self, ctx: Context) -> impl Future<Output = Response> + Send {
        let fut = (self)(ctx);
        async move { fut.await.into_response() }
    }
}

/// Dynamic object-safe version of [`Handler`].
pub trait DynHandler: Send + Sync + 'static {
    /// Handle one request (dynamic dispatch version).
    fn call_dyn(&self, ctx: Context) -> BoxFuture<'_, Response>;
}

// Blanket implementation: Any type implementing Handler implements DynHandler automatically.
impl<T: Handler> DynHandler for T {
    fn call_dyn(&self, ctx: Context) -> BoxFuture<'_, Response> {
        Box::pin(self.call(ctx))
    }
}

/// A shared, type-erased handler.
///
/// Cloning is a reference-count bump, so the same handler can sit in several
/// route tables (e.g. after mounting) without being rebuilt.
#[derive(Clone)]
pub struct BoxHandler {
    inner: Arc<dyn DynHandler>,
}

impl BoxHandler {
    /// Erase a handler.
    pub fn new<H: Handler>(handler: H) -> Self {
        Self {
            inner: Arc::new(handler),
        }
    }
}

impl fmt::Debug for BoxHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxHandler").finish_non_exhaustive()
    }
}

impl Handler for BoxHandler {
    fn call(&self, ctx: Context) -> impl Future<Output = Response> + Send {
        self.inner.call_dyn(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use http::{Method, StatusCode};

    struct Echo;

    impl Handler for Echo {
        async fn call(&self, ctx: Context) -> Response {
            ctx.path().to_string().into_response()
        }
    }

    fn ctx(path: &str) -> Context {
        Context::new(Request::new(Method::GET, path))
    }

    #[tokio::test]
    async fn test_closure_handler() {
        let handler = |_ctx: Context| async { (StatusCode::CREATED, "made") };
        let response = Handler::call(&handler, ctx("/")).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.body_text(), "made");
    }

    #[tokio::test]
    async fn test_struct_handler_through_box() {
        let boxed = BoxHandler::new(Echo);
        let cloned = boxed.clone();
        assert_eq!(cloned.call(ctx("/echo")).await.body_text(), "/echo");
        assert_eq!(boxed.call_dyn(ctx("/again")).await.body_text(), "/again");
    }
}
