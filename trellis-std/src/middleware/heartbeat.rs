//! Liveness endpoint.

use http::{Method, StatusCode};
use trellis_core::{BoxHandler, Context, Handler, Middleware, Response};

/// Answers `GET`/`HEAD` on a fixed path with `200 .` without reaching the
/// route table's handlers.
///
/// The path comparison ignores ASCII case. Any other request passes through.
///
/// ```rust
/// use trellis_std::{Router, middleware::Heartbeat};
///
/// let mut router = Router::new();
/// router.use_middleware(Heartbeat::new("/ping"));
/// ```
#[derive(Debug, Clone)]
pub struct Heartbeat {
    path: String,
}

impl Heartbeat {
    /// Respond on `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Middleware for Heartbeat {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        BoxHandler::new(HeartbeatHandler {
            path: self.path.clone(),
            next,
        })
    }
}

struct HeartbeatHandler {
    path: String,
    next: BoxHandler,
}

impl Handler for HeartbeatHandler {
    async fn call(&self, ctx: Context) -> Response {
        let method = ctx.method();
        let is_heartbeat = (*method == Method::GET || *method == Method::HEAD)
            && ctx.path().eq_ignore_ascii_case(&self.path);
        if is_heartbeat {
            return Response::text(StatusCode::OK, ".");
        }
        self.next.call(ctx).await
    }
}
