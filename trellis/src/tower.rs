//! Tower integration.
//!
//! - [`RouterService`] serves a [`Router`] as a `tower::Service`, so it can
//!   sit behind any tower-based server or be wrapped in tower layers.
//! - [`ServiceHandler`] goes the other way: it registers an existing
//!   `tower::Service` as a route handler.
//!
//! ```rust
//! use std::future::poll_fn;
//! use tower::Service;
//! use trellis::{prelude::*, tower::RouterService};
//!
//! # async fn demo() -> Result<(), trellis::BoxError> {
//! let mut router = Router::new();
//! router.get("/", |_ctx: Context| async { "Hello World!" })?;
//!
//! let mut service = RouterService::new(router);
//! poll_fn(|cx| Service::<Request>::poll_ready(&mut service, cx)).await?;
//! let response = service.call(Request::new(Method::GET, "/")).await?;
//! assert_eq!(response.body_text(), "Hello World!");
//! # Ok(())
//! # }
//! # futures::executor::block_on(demo()).unwrap();
//! ```

use crate::{BoxError, Context, Handler, Request, Response, Router, StatusCode};
use futures::future::BoxFuture;
use std::{
    convert::Infallible,
    sync::Arc,
    task::{self, Poll},
};

// ============================================================================
// Router → Service
// ============================================================================

/// A shared [`Router`] exposed as a `tower::Service`.
///
/// Routing never fails at the service level: unmatched requests are answered
/// by the router's fallbacks, so the error type is [`Infallible`].
#[derive(Clone, Debug)]
pub struct RouterService {
    router: Arc<Router>,
}

impl RouterService {
    /// Serve `router`.
    pub fn new(router: Router) -> Self {
        Self::from_shared(Arc::new(router))
    }

    /// Serve an already shared router.
    pub fn from_shared(router: Arc<Router>) -> Self {
        Self { router }
    }

    /// The router being served.
    pub fn router(&self) -> &Router {
        &self.router
    }
}

impl ::tower::Service<Context> for RouterService {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        // The router is immutable; always ready.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, ctx: Context) -> Self::Future {
        let router = Arc::clone(&self.router);
        Box::pin(async move { Ok(router.handle(ctx).await) })
    }
}

impl ::tower::Service<Request> for RouterService {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        ::tower::Service::<Context>::call(self, Context::new(request))
    }
}

// ============================================================================
// Service → Handler
// ============================================================================

/// A `tower::Service` used as a route handler.
///
/// Each request clones the service, waits for readiness, then calls it. A
/// service error becomes `500 Internal Server Error` and is logged.
#[derive(Clone, Debug)]
pub struct ServiceHandler<S> {
    service: S,
}

impl<S> ServiceHandler<S> {
    /// Wrap `service`.
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// The wrapped service.
    pub fn inner(&self) -> &S {
        &self.service
    }
}

impl<S> Handler for ServiceHandler<S>
where
    S: ::tower::Service<Context, Response = Response> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
{
    async fn call(&self, ctx: Context) -> Response {
        let mut service = self.service.clone();
        if let Err(err) = std::future::poll_fn(|cx| service.poll_ready(cx)).await {
            return service_failed(err.into());
        }
        match service.call(ctx).await {
            Ok(response) => response,
            Err(err) => service_failed(err.into()),
        }
    }
}

fn service_failed(err: BoxError) -> Response {
    tracing::error!(error = %err, "service handler failed");
    Response::new(StatusCode::INTERNAL_SERVER_ERROR)
}
