mod common;

use common::{User, get, init_tracing, send};
use trellis::{
    BoxHandler, Context, Handler, HeaderValue, IntoResponse, Method, Middleware, Next, Request,
    Router, StatusCode, from_fn, header,
    middleware::{Heartbeat, Logger, NoCache, Recoverer},
};

// ============================================================================
// Test Middleware
// ============================================================================

/// Injects the authenticated user, or rejects the request outright.
struct Auth;

impl Middleware for Auth {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        BoxHandler::new(move |mut ctx: Context| {
            let next = next.clone();
            async move {
                let authorized = ctx
                    .headers()
                    .get(header::AUTHORIZATION)
                    .is_some_and(|token| token == "Bearer 123");
                if !authorized {
                    return StatusCode::UNAUTHORIZED.into_response();
                }
                ctx.insert(User("123".into()));
                next.call(ctx).await
            }
        })
    }
}

fn authorized(path: &str) -> Context {
    let mut ctx = Context::new(Request::new(Method::GET, path));
    ctx.request_mut()
        .headers_mut()
        .insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer 123"));
    ctx
}

async fn whoami(ctx: Context) -> String {
    ctx.get::<User>()
        .map_or_else(|| "anonymous".to_string(), |user| user.0.clone())
}

#[tokio::test]
async fn test_auth_injects_user_for_group_only() {
    let mut router = Router::new();
    router.get("/public", whoami).unwrap();
    router
        .group(|r| {
            r.use_middleware(Auth);
            r.get("/me", whoami)?;
            Ok(())
        })
        .unwrap();

    assert_eq!(router.handle(authorized("/public")).await.body_text(), "anonymous");
    assert_eq!(router.handle(authorized("/me")).await.body_text(), "123");
    assert_eq!(get(&router, "/me").await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_value_injected_inside_is_invisible_outside() {
    let mut router = Router::new();
    router.use_middleware(from_fn(|ctx: Context, next: Next| async move {
        let seen_before = ctx.get::<User>().is_some();
        let mut response = next.run(ctx).await;
        response.headers_mut().insert(
            "x-user-before",
            HeaderValue::from_static(if seen_before { "yes" } else { "no" }),
        );
        response
    }));
    router.use_middleware(from_fn(|mut ctx: Context, next: Next| async move {
        ctx.insert(User("123".into()));
        next.run(ctx).await
    }));
    router.get("/", whoami).unwrap();

    let response = get(&router, "/").await;
    assert_eq!(response.body_text(), "123");
    assert_eq!(response.headers().get("x-user-before").unwrap(), "no");
}

#[tokio::test]
async fn test_recoverer_and_logger_together() {
    init_tracing();

    let mut router = Router::new();
    router.use_middleware(Logger::new());
    router.use_middleware(Recoverer);
    router
        .get("/panic", |ctx: Context| async move {
            if ctx.path() == "/panic" {
                panic!("handler blew up");
            }
            "unreachable"
        })
        .unwrap();
    router.get("/ok", |_ctx: Context| async { "ok" }).unwrap();

    assert_eq!(
        get(&router, "/panic").await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    // The router keeps serving after a panic.
    assert_eq!(get(&router, "/ok").await.body_text(), "ok");
}

#[tokio::test]
async fn test_heartbeat_answers_before_routing() {
    let mut router = Router::new();
    router.use_middleware(Heartbeat::new("/ping"));
    router.get("/", common::hello).unwrap();

    // No `/ping` route exists, but the not-found fallback runs inside the chain.
    let response = get(&router, "/ping").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body_text(), ".");

    let response = send(&router, Method::POST, "/ping").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_no_cache_headers_on_routes_and_fallbacks() {
    let mut router = Router::new();
    router.use_middleware(NoCache);
    router.get("/", common::hello).unwrap();

    for path in ["/", "/missing"] {
        let response = get(&router, path).await;
        assert_eq!(response.headers().get(header::PRAGMA).unwrap(), "no-cache");
        assert_eq!(
            response.headers().get(header::EXPIRES).unwrap(),
            "Thu, 01 Jan 1970 00:00:00 UTC"
        );
    }
}

#[cfg(feature = "timeout")]
#[tokio::test]
async fn test_timeout_returns_gateway_timeout() {
    use std::time::Duration;
    use trellis::middleware::Timeout;

    let mut router = Router::new();
    router.use_middleware(Timeout::new(Duration::from_millis(20)));
    router
        .get("/slow", |ctx: Context| async move {
            tokio::select! {
                () = tokio::time::sleep(Duration::from_secs(5)) => "done",
                () = ctx.cancelled() => "cancelled",
            }
        })
        .unwrap();
    router.get("/fast", |_ctx: Context| async { "fast" }).unwrap();

    assert_eq!(get(&router, "/slow").await.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(get(&router, "/fast").await.body_text(), "fast");
}
