#![allow(dead_code)]

use trellis::{Context, IntoResponse, Method, Request, Response, Router, StatusCode};

// ============================================================================
// Dispatch helpers
// ============================================================================

pub async fn get(router: &Router, path: &str) -> Response {
    router.call(Method::GET, path).await
}

pub async fn send(router: &Router, method: Method, path: &str) -> Response {
    router
        .handle(Context::new(Request::new(method, path)))
        .await
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Test Context Values
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct User(pub String);

// ============================================================================
// Demo handlers
// ============================================================================

pub async fn hello(_ctx: Context) -> &'static str {
    "Hello World!"
}

pub async fn user_profile(ctx: Context) -> Response {
    let user_id = ctx.param("user_id").unwrap_or_default();
    if user_id.is_empty() {
        return (StatusCode::UNPROCESSABLE_ENTITY, "error: empty user id").into_response();
    }
    if user_id.parse::<u64>().is_err() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("error: user id is not numeric. user id: {user_id}"),
        )
            .into_response();
    }
    format!("This is profile of user id: {user_id}").into_response()
}

pub async fn article(ctx: Context) -> String {
    format!("article {}", ctx.param("article_id").unwrap_or_default())
}
