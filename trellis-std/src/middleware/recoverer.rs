//! Panic recovery.

use futures::FutureExt;
use http::StatusCode;
use std::{any::Any, panic::AssertUnwindSafe};
use trellis_core::{BoxHandler, Context, Handler, Middleware, Response};

/// Catches a panic anywhere downstream and answers `500 Internal Server Error`.
///
/// The panic message is logged at `ERROR`. Place it early in the chain so it
/// covers the middleware after it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recoverer;

impl Middleware for Recoverer {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        BoxHandler::new(RecovererHandler { next })
    }
}

struct RecovererHandler {
    next: BoxHandler,
}

impl Handler for RecovererHandler {
    async fn call(&self, ctx: Context) -> Response {
        let method = ctx.method().clone();
        let path = ctx.path().to_owned();

        match AssertUnwindSafe(self.next.call(ctx)).catch_unwind().await {
            Ok(response) => response,
            Err(payload) => {
                tracing::error!(
                    %method,
                    %path,
                    panic = panic_message(payload.as_ref()),
                    "handler panicked"
                );
                Response::new(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
