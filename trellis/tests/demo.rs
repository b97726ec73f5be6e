//! The routing tour: hello world, path parameters, mounting, `route`
//! blocks, groups with partial middleware, and a custom method.

mod common;

use common::{User, article, get, hello, send, user_profile};
use trellis::{
    Context, InsertError, Method, Next, RouteError, Router, StatusCode, from_fn,
    middleware::Logger,
};

async fn transaction_list(_ctx: Context) -> &'static str {
    "transactions"
}

async fn transaction_detail(ctx: Context) -> String {
    format!("transaction {}", ctx.param("tx_id").unwrap_or_default())
}

async fn transaction_modify(ctx: Context) -> String {
    format!("modified {}", ctx.param("tx_id").unwrap_or_default())
}

fn is_duplicate(result: Result<&mut Router, RouteError>) -> bool {
    matches!(
        result,
        Err(RouteError::Insert(InsertError::DuplicateRoute { .. }))
    )
}

fn tour() -> Router {
    let mut r = Router::new();
    r.use_middleware(Logger::new());

    // 1. Hello world
    r.get("/", hello).unwrap();

    // 2. Path parameter
    r.get("/user/{user_id}", user_profile).unwrap();
    r.get("/articles/{rid:^[0-9]{5,6}}", |ctx: Context| async move {
        format!("article {}", ctx.param("rid").unwrap_or_default())
    })
    .unwrap();

    // 3.1 Mounting
    let mut user_api = Router::new();
    user_api.get("/{user_id}", user_profile).unwrap();
    // Same method and path as the route in step 2.
    assert!(is_duplicate(r.mount("/user", user_api)));

    let mut blog_api = Router::new();
    blog_api.get("/article/{article_id}", article).unwrap();
    r.mount("/api", blog_api).unwrap();

    // 3.2 Route blocks
    r.route("/transaction", |r| {
        r.get("/", transaction_list)?;
        r.route("/{tx_id}", |r| {
            r.get("/", transaction_detail)?;
            r.post("/", transaction_modify)?;
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    // 4. Groups
    r.group(|r| {
        assert!(is_duplicate(r.get("/", hello)));
        r.get("/all-products", |_ctx: Context| async { "your products" })?;
        Ok(())
    })
    .unwrap();

    r.group(|r| {
        r.use_middleware(from_fn(|mut ctx: Context, next: Next| async move {
            ctx.insert(User("123".into()));
            next.run(ctx).await
        }));
        assert!(is_duplicate(r.get("/transaction", transaction_list)));
        r.get("/my/transactions", |ctx: Context| async move {
            let user = ctx.get::<User>().map_or("nobody", |u| u.0.as_str()).to_owned();
            format!("your transactions, user {user}")
        })?;
        Ok(())
    })
    .unwrap();

    // Custom method
    let jello = Method::from_bytes(b"JELLO").unwrap();
    r.on(jello, "/path", |_ctx: Context| async { "jello" }).unwrap();

    r
}

#[tokio::test]
async fn test_tour_dispatch() {
    common::init_tracing();
    let router = tour();

    let cases: &[(&str, StatusCode, &str)] = &[
        ("/", StatusCode::OK, "Hello World!"),
        ("/user/7", StatusCode::OK, "This is profile of user id: 7"),
        (
            "/user/abc",
            StatusCode::UNPROCESSABLE_ENTITY,
            "error: user id is not numeric. user id: abc",
        ),
        ("/articles/12345", StatusCode::OK, "article 12345"),
        ("/articles/1234", StatusCode::NOT_FOUND, "404 page not found"),
        ("/api/article/42", StatusCode::OK, "article 42"),
        ("/transaction", StatusCode::OK, "transactions"),
        ("/transaction/abc", StatusCode::OK, "transaction abc"),
        ("/all-products", StatusCode::OK, "your products"),
        ("/my/transactions", StatusCode::OK, "your transactions, user 123"),
    ];
    for (path, status, body) in cases {
        let response = get(&router, path).await;
        assert_eq!(response.status(), *status, "{path}");
        assert_eq!(response.body_text(), *body, "{path}");
    }

    let response = send(&router, Method::POST, "/transaction/abc").await;
    assert_eq!(response.body_text(), "modified abc");

    let jello = Method::from_bytes(b"JELLO").unwrap();
    assert_eq!(send(&router, jello, "/path").await.body_text(), "jello");
    assert_eq!(
        get(&router, "/path").await.status(),
        StatusCode::METHOD_NOT_ALLOWED
    );
}

#[test]
fn test_tour_route_listing() {
    let router = tour();
    let listed: Vec<String> = router
        .routes()
        .map(|(method, pattern)| format!("{method} {pattern}"))
        .collect();
    assert_eq!(
        listed,
        [
            "GET /",
            "GET /user/{user_id}",
            "GET /articles/{rid:^[0-9]{5,6}}",
            "GET /api/article/{article_id}",
            "GET /transaction",
            "GET /transaction/{tx_id}",
            "POST /transaction/{tx_id}",
            "GET /all-products",
            "GET /my/transactions",
            "JELLO /path",
        ]
    );
}
