//! # trellis-core
//!
//! Core types and traits for the trellis HTTP router.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! middleware and handler crates that don't need the route table or the
//! router itself (those live in `trellis-std`).
//!
//! # Layers
//!
//! ## Request & Response
//!
//! [`Request`] is the part of an inbound request the router looks at
//! (method, path, headers). [`Response`] is what every handler produces;
//! anything implementing [`IntoResponse`] can be returned from a handler.
//!
//! ## Context
//!
//! [`Context`] is the per-request state moved down the middleware chain. It
//! owns the request, the extracted path [`Params`], and a typed extension map
//! for values injected by middleware. Because it is moved, a value inserted by
//! a middleware is visible downstream only.
//!
//! ## Handler
//!
//! [`Handler`] is the terminal endpoint. Async closures taking a [`Context`]
//! implement it automatically. [`BoxHandler`] is the type-erased, cheaply
//! clonable form stored in route tables.
//!
//! ## Middleware
//!
//! [`Middleware`] wraps a handler and returns a new one. A [`Chain`] applies
//! an ordered list so that `[m1, m2, m3]` around `h` runs as `m1(m2(m3(h)))`.
//!
//! # Error Types
//!
//! - [`CompileError`] - malformed route patterns
//! - [`InsertError`] - ambiguous or duplicate registrations
//! - [`RouteError`] - anything a registration call can fail with

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod error;
mod handler;
mod middleware;
mod request;
mod response;

// Re-exports
pub use context::{Context, Params};
pub use error::{BoxError, CompileError, InsertError, RouteError};
pub use handler::{BoxHandler, DynHandler, Handler};
pub use middleware::{Chain, FromFn, Middleware, Next, from_fn};
pub use request::Request;
pub use response::{IntoResponse, Response};

pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
pub use tokio_util::sync::CancellationToken;
