//! Time-limited handlers.

use super::saturating_u64;
use http::StatusCode;
use std::time::Duration;
use tokio::time::timeout;
use trellis_core::{BoxHandler, Context, Handler, Middleware, Response};

/// Bounds how long the downstream chain may run.
///
/// When the limit elapses the downstream future is dropped, the request's
/// cancellation token (a child of the transport's, if any) is cancelled, and
/// `504 Gateway Timeout` is returned.
#[derive(Debug, Clone, Copy)]
pub struct Timeout {
    duration: Duration,
}

impl Timeout {
    /// Create a timeout middleware.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Middleware for Timeout {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        BoxHandler::new(TimeoutHandler {
            duration: self.duration,
            next,
        })
    }
}

struct TimeoutHandler {
    duration: Duration,
    next: BoxHandler,
}

impl Handler for TimeoutHandler {
    async fn call(&self, mut ctx: Context) -> Response {
        let token = ctx
            .cancellation()
            .map(|parent| parent.child_token())
            .unwrap_or_default();
        ctx.set_cancellation(token.clone());

        match timeout(self.duration, self.next.call(ctx)).await {
            Ok(response) => response,
            Err(_) => {
                token.cancel();
                tracing::warn!(
                    timeout_ms = saturating_u64(self.duration.as_millis()),
                    "handler timed out"
                );
                Response::new(StatusCode::GATEWAY_TIMEOUT)
            }
        }
    }
}
