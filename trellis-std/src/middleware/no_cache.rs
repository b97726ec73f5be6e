//! Cache suppression.

use http::{HeaderName, HeaderValue, header};
use trellis_core::{BoxHandler, Context, Handler, Middleware, Response};

static ETAG_HEADERS: [HeaderName; 6] = [
    header::ETAG,
    header::IF_MODIFIED_SINCE,
    header::IF_MATCH,
    header::IF_NONE_MATCH,
    header::IF_RANGE,
    header::IF_UNMODIFIED_SINCE,
];

/// Marks responses as uncacheable.
///
/// Strips the conditional-request headers from the request so downstream
/// handlers never answer `304`, and sets `Cache-Control`, `Pragma`,
/// `Expires` and `X-Accel-Expires` on the response.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl Middleware for NoCache {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        BoxHandler::new(NoCacheHandler { next })
    }
}

struct NoCacheHandler {
    next: BoxHandler,
}

impl Handler for NoCacheHandler {
    async fn call(&self, mut ctx: Context) -> Response {
        let headers = ctx.request_mut().headers_mut();
        for name in &ETAG_HEADERS {
            headers.remove(name);
        }

        let mut response = self.next.call(ctx).await;

        let headers = response.headers_mut();
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(
                "no-cache, no-store, no-transform, must-revalidate, private, max-age=0",
            ),
        );
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(
            header::EXPIRES,
            HeaderValue::from_static("Thu, 01 Jan 1970 00:00:00 UTC"),
        );
        headers.insert(
            HeaderName::from_static("x-accel-expires"),
            HeaderValue::from_static("0"),
        );
        response
    }
}
