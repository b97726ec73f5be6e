mod common;

use common::user_profile;
use std::sync::Arc;
use trellis::{Method, Router, StatusCode, middleware::Logger};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_router_serves_parallel_requests() {
    let mut router = Router::new();
    router.use_middleware(Logger::new());
    router.get("/user/{user_id}", user_profile).unwrap();
    let router = Arc::new(router);

    let tasks: Vec<_> = (0..64u32)
        .map(|i| {
            let router = Arc::clone(&router);
            tokio::spawn(async move {
                let response = router.call(Method::GET, &format!("/user/{i}")).await;
                (i, response)
            })
        })
        .collect();

    for task in tasks {
        let (i, response) = task.await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.body_text(),
            format!("This is profile of user id: {i}")
        );
    }
}
