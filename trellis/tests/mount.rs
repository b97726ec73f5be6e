mod common;

use common::{article, get, send};
use trellis::{
    Context, InsertError, Method, RouteError, Router, RouterConfig, StatusCode, header,
    testing::{Journal, RecordingMiddleware, recording_handler},
};

#[tokio::test]
async fn test_mounted_route_runs_parent_then_sub_middleware() {
    let journal = Journal::new();

    let mut blog = Router::new();
    blog.use_middleware(RecordingMiddleware::new("M", &journal));
    let handler_journal = journal.clone();
    blog.get("/article/{article_id}", move |ctx: Context| {
        let journal = handler_journal.clone();
        async move {
            journal.record("h");
            article(ctx).await
        }
    })
    .unwrap();

    let mut root = Router::new();
    root.use_middleware(RecordingMiddleware::new("L", &journal));
    root.mount("/api", blog).unwrap();

    let response = get(&root, "/api/article/42").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body_text(), "article 42");
    assert_eq!(journal.entries(), ["L>", "M>", "h", "<M", "<L"]);
}

#[tokio::test]
async fn test_use_only_wraps_later_routes() {
    let journal = Journal::new();
    let mut router = Router::new();
    router.get("/a", recording_handler("h1", &journal)).unwrap();
    router.use_middleware(RecordingMiddleware::new("mw", &journal));
    router.get("/b", recording_handler("h2", &journal)).unwrap();

    get(&router, "/a").await;
    assert_eq!(journal.entries(), ["h1"]);

    journal.clear();
    get(&router, "/b").await;
    assert_eq!(journal.entries(), ["mw>", "h2", "<mw"]);
}

#[tokio::test]
async fn test_group_middleware_does_not_leak_to_siblings() {
    let journal = Journal::new();
    let mut router = Router::new();
    router.use_middleware(RecordingMiddleware::new("outer", &journal));

    router
        .group(|r| {
            r.get("/open", recording_handler("open", &journal))?;
            Ok(())
        })
        .unwrap()
        .group(|r| {
            r.use_middleware(RecordingMiddleware::new("auth", &journal));
            r.get("/private", recording_handler("private", &journal))?;
            Ok(())
        })
        .unwrap();
    router.get("/after", recording_handler("after", &journal)).unwrap();

    get(&router, "/open").await;
    assert_eq!(journal.entries(), ["outer>", "open", "<outer"]);

    journal.clear();
    get(&router, "/private").await;
    assert_eq!(
        journal.entries(),
        ["outer>", "auth>", "private", "<auth", "<outer"]
    );

    journal.clear();
    get(&router, "/after").await;
    assert_eq!(journal.entries(), ["outer>", "after", "<outer"]);
}

#[tokio::test]
async fn test_group_restores_chain_on_error() {
    let journal = Journal::new();
    let mut router = Router::new();

    let err = router
        .group(|r| {
            r.use_middleware(RecordingMiddleware::new("leaky", &journal));
            r.get("no-slash", recording_handler("never", &journal))?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, RouteError::Compile(_)));

    router.get("/x", recording_handler("x", &journal)).unwrap();
    get(&router, "/x").await;
    assert_eq!(journal.entries(), ["x"]);
}

#[tokio::test]
async fn test_nested_route_blocks() {
    let mut router = Router::new();
    router
        .route("/transaction", |r| {
            r.get("/", |_ctx: Context| async { "list" })?;
            r.route("/{tx_id}", |r| {
                r.get("/", |ctx: Context| async move {
                    format!("detail {}", ctx.param("tx_id").unwrap_or_default())
                })?;
                r.post("/", |ctx: Context| async move {
                    format!("modify {}", ctx.param("tx_id").unwrap_or_default())
                })?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    assert_eq!(get(&router, "/transaction").await.body_text(), "list");
    assert_eq!(get(&router, "/transaction/").await.body_text(), "list");
    assert_eq!(get(&router, "/transaction/t-9").await.body_text(), "detail t-9");
    assert_eq!(
        send(&router, Method::POST, "/transaction/t-9").await.body_text(),
        "modify t-9"
    );
    assert_eq!(
        send(&router, Method::DELETE, "/transaction/t-9").await.status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
}

#[tokio::test]
async fn test_mount_prefix_params_are_bound() {
    let mut repo = Router::new();
    repo.get("/issues/{n}", |ctx: Context| async move {
        format!(
            "{}#{}",
            ctx.param("repo").unwrap_or_default(),
            ctx.param("n").unwrap_or_default()
        )
    })
    .unwrap();

    let mut root = Router::new();
    root.mount("/repos/{repo}", repo).unwrap();

    assert_eq!(get(&root, "/repos/trellis/issues/3").await.body_text(), "trellis#3");
}

#[tokio::test]
async fn test_mounted_fallbacks_answer_under_their_prefix() {
    let journal = Journal::new();

    let mut sub = Router::new();
    sub.use_middleware(RecordingMiddleware::new("sub", &journal));
    sub.get("/known", |_ctx: Context| async { "known" }).unwrap();
    sub.not_found(|_ctx: Context| async { (StatusCode::NOT_FOUND, "sub") });

    let mut root = Router::new();
    root.use_middleware(RecordingMiddleware::new("root", &journal));
    root.not_found(|_ctx: Context| async { (StatusCode::NOT_FOUND, "root") });
    root.mount("/sub", sub).unwrap();

    assert_eq!(get(&root, "/sub/known").await.body_text(), "known");

    journal.clear();
    let response = get(&root, "/sub/unknown").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body_text(), "sub");
    assert_eq!(journal.entries(), ["root>", "sub>", "<sub", "<root"]);

    assert_eq!(get(&root, "/elsewhere").await.body_text(), "root");
    // Only the not-found fallback was customised on the sub-router.
    let response = send(&root, Method::POST, "/sub/known").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET");
}

#[tokio::test]
async fn test_deepest_mounted_fallback_wins() {
    let mut inner = Router::new();
    inner.get("/x", |_ctx: Context| async { "x" }).unwrap();
    inner.not_found(|_ctx: Context| async { (StatusCode::NOT_FOUND, "inner") });

    let mut outer = Router::new();
    outer.not_found(|_ctx: Context| async { (StatusCode::NOT_FOUND, "outer") });
    outer.method_not_allowed(|_ctx: Context| async {
        (StatusCode::METHOD_NOT_ALLOWED, "outer 405")
    });
    outer.mount("/inner", inner).unwrap();

    let mut root = Router::new();
    root.mount("/v1/{tenant}", outer).unwrap();

    assert_eq!(get(&root, "/v1/acme/inner/y").await.body_text(), "inner");
    assert_eq!(get(&root, "/v1/acme/other").await.body_text(), "outer");
    assert_eq!(
        send(&root, Method::PUT, "/v1/acme/inner/x").await.body_text(),
        "outer 405"
    );
    assert_eq!(get(&root, "/v2").await.body_text(), "404 page not found");
}

#[tokio::test]
async fn test_mounted_routes_keep_their_decoding() {
    let mut raw = Router::with_config(RouterConfig::default().decode_params(false));
    raw.get("/{term}", |ctx: Context| async move {
        ctx.param("term").unwrap_or_default().to_string()
    })
    .unwrap();

    let mut root = Router::new();
    root.get("/decoded/{term}", |ctx: Context| async move {
        ctx.param("term").unwrap_or_default().to_string()
    })
    .unwrap();
    root.mount("/raw", raw).unwrap();

    assert_eq!(get(&root, "/raw/a%20b").await.body_text(), "a%20b");
    assert_eq!(get(&root, "/decoded/a%20b").await.body_text(), "a b");
}

#[test]
fn test_mount_rejects_clashing_routes() {
    let mut root = Router::new();
    root.get("/user/{user_id}", common::user_profile).unwrap();

    let mut users = Router::new();
    users.get("/{user_id}", common::user_profile).unwrap();

    let err = root.mount("/user", users).unwrap_err();
    assert!(matches!(
        err,
        RouteError::Insert(InsertError::DuplicateRoute { .. })
    ));

    let mut users = Router::new();
    users.get("/{id}", common::user_profile).unwrap();
    let err = root.mount("/user", users).unwrap_err();
    assert!(matches!(
        err,
        RouteError::Insert(InsertError::ConflictingParamNames { .. })
    ));
}

#[test]
fn test_mount_rejects_duplicate_param_across_prefix() {
    let mut sub = Router::new();
    sub.get("/{id}", |_ctx: Context| async {}).unwrap();

    let mut root = Router::new();
    let err = root.mount("/things/{id}", sub).unwrap_err();
    assert!(matches!(err, RouteError::Compile(_)));
}
