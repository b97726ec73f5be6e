//! # trellis - HTTP request router
//!
//! `trellis` maps an HTTP method and path to a handler, extracting named
//! parameters from the path and running the handler inside an onion-ordered
//! middleware chain. Routers nest: a sub-router built independently can be
//! mounted under a prefix, and its routes run inside the parent's middleware
//! followed by its own.
//!
//! The transport (HTTP server) is out of scope: feed [`Router::handle`] a
//! [`Context`] built from whatever your server hands you, or enable the
//! `tower` feature and use [`tower::RouterService`].
//!
//! ## Quick Start
//!
//! ```rust
//! use trellis::prelude::*;
//!
//! #[derive(Clone)]
//! struct User(&'static str);
//!
//! # async fn demo() -> Result<(), RouteError> {
//! let mut router = Router::new();
//! router.use_middleware(trellis::middleware::Logger::new());
//!
//! router.get("/", |_ctx: Context| async { "Hello World!" })?;
//! router.route("/transaction", |r| {
//!     r.use_middleware(from_fn(|mut ctx: Context, next: Next| async move {
//!         ctx.insert(User("123"));
//!         next.run(ctx).await
//!     }));
//!     r.get("/{tx_id}", |ctx: Context| async move {
//!         let user = ctx.get::<User>().map_or("nobody", |u| u.0);
//!         format!("tx {} for {user}", ctx.param("tx_id").unwrap_or_default())
//!     })?;
//!     Ok(())
//! })?;
//!
//! let response = router.call(Method::GET, "/transaction/9").await;
//! assert_eq!(response.body_text(), "tx 9 for 123");
//! # Ok(())
//! # }
//! # futures::executor::block_on(demo()).unwrap();
//! ```
//!
//! ## Features
//!
//! - `tower`: [`tower::RouterService`] and [`tower::ServiceHandler`]
//! - `timeout`: the `Timeout` middleware (pulls in `tokio`'s timer)

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use trellis_core::{
    // Errors
    BoxError,
    // Handlers
    BoxHandler,
    CancellationToken,
    // Middleware
    Chain,
    CompileError,
    // Context
    Context,
    DynHandler,
    FromFn,
    Handler,
    // http
    HeaderMap,
    HeaderName,
    HeaderValue,
    InsertError,
    // Response
    IntoResponse,
    Method,
    Middleware,
    Next,
    Params,
    // Request
    Request,
    Response,
    RouteError,
    StatusCode,
    from_fn,
    header,
};

pub use trellis_std::{
    AllowedMethods, CompiledPattern, Lookup, RouteTable, Router, RouterConfig, Segment, compile,
};

/// Standard middleware.
pub mod middleware {
    #![allow(clippy::wildcard_imports)]
    pub use trellis_std::middleware::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use trellis_std::testing::*;
}

#[cfg(feature = "tower")]
pub mod tower;

/// Prelude module - common imports for trellis.
///
/// # Usage
///
/// ```rust
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Core traits
        Context,
        Handler,
        // Response
        IntoResponse,
        Method,
        Middleware,
        Next,
        Request,
        Response,
        // Errors
        RouteError,
        Router,
        StatusCode,
        from_fn,
    };
}
