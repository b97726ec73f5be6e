//! Request logging.

use super::saturating_u64;
use std::time::Instant;
use trellis_core::{BoxHandler, Context, Handler, Middleware, Response};

/// Logs every request that passes through it with `tracing`.
///
/// Emits one event after the downstream handler returns, carrying the
/// method, path, status and elapsed time. Server errors are logged at
/// `WARN`, everything else at `INFO`.
///
/// ```rust
/// use trellis_std::{Router, middleware::Logger};
///
/// let mut router = Router::new();
/// router.use_middleware(Logger::named("api"));
/// ```
#[derive(Debug, Clone)]
pub struct Logger {
    name: &'static str,
}

impl Logger {
    /// Create a `Logger` with the default name.
    pub fn new() -> Self {
        Self { name: "http" }
    }

    /// Create a `Logger` whose events carry `name`.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for Logger {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        BoxHandler::new(LoggerHandler {
            name: self.name,
            next,
        })
    }
}

struct LoggerHandler {
    name: &'static str,
    next: BoxHandler,
}

impl Handler for LoggerHandler {
    async fn call(&self, ctx: Context) -> Response {
        let method = ctx.method().clone();
        let path = ctx.path().to_owned();
        let started = Instant::now();

        let response = self.next.call(ctx).await;

        let status = response.status();
        let elapsed_us = saturating_u64(started.elapsed().as_micros());
        if status.is_server_error() {
            tracing::warn!(
                name = %self.name,
                %method,
                %path,
                status = status.as_u16(),
                elapsed_us,
                "request failed"
            );
        } else {
            tracing::info!(
                name = %self.name,
                %method,
                %path,
                status = status.as_u16(),
                elapsed_us,
                "request completed"
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use trellis_core::Request;

    #[tokio::test]
    async fn test_logger_passes_response_through() {
        let handler = Logger::new().wrap(BoxHandler::new(|_ctx: Context| async {
            (StatusCode::CREATED, "made")
        }));
        let response = handler
            .call(Context::new(Request::new(Method::POST, "/things")))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.body_text(), "made");
    }
}
