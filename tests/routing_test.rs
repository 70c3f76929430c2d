//! Route table behavior through the public API.

use std::sync::Arc;
use std::thread;

use axum::body::Body;
use axum::http::{Method, StatusCode};
use minimux::routing::MatchedPattern;
use minimux::{Params, RegistrationPolicy, Request, RouteError, Router};

async fn send(router: &Router, method: Method, path: &str) -> (StatusCode, String) {
    let req = axum::http::Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    let res = router.dispatch(req).await;
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn text(s: &'static str) -> impl Fn(Request) -> std::future::Ready<&'static str> + Send + Sync + 'static {
    move |_req: Request| std::future::ready(s)
}

/// Echoes the matched pattern and the captured parameters in key order.
async fn echo(req: Request) -> String {
    let pattern = req
        .extensions()
        .get::<MatchedPattern>()
        .map(|p| p.0.clone())
        .unwrap_or_default();
    let mut params: Vec<String> = Params::of(&req).iter().map(|(k, v)| format!("{k}={v}")).collect();
    params.sort();
    format!("{pattern} {}", params.join(","))
}

fn registered_routes() -> Router {
    let router = Router::new();
    router.get("/test", echo).unwrap();
    router.post("/test/foo", echo).unwrap();
    router.put("/test/foo/:id", echo).unwrap();
    router.delete("/test/foo/:id", echo).unwrap();
    router.post("/test/foo/:id/bar", echo).unwrap();
    router.get("/test/foo/:id/bar/:barID", echo).unwrap();
    router.put("/test/foo/:id/bar/:barID", echo).unwrap();
    router.get("/test/foo/baz", echo).unwrap();
    router.get("/test/foo/{blah}", echo).unwrap();
    router
}

#[tokio::test]
async fn test_every_default_method_routes() {
    for method in minimux::routing::DEFAULT_METHODS {
        let router = Router::new();
        router.route(method.clone(), "/test", text("ok")).unwrap();
        let (status, _) = send(&router, method.clone(), "/test").await;
        assert_eq!(status, StatusCode::OK, "{method}");
    }
}

#[tokio::test]
async fn test_multiple_routes() {
    let router = registered_routes();
    let cases = [
        (Method::GET, "/test", StatusCode::OK),
        (Method::POST, "/test", StatusCode::NOT_FOUND),
        (Method::POST, "/test/foo", StatusCode::OK),
        (Method::POST, "/test/foo/1", StatusCode::NOT_FOUND),
        (Method::PUT, "/test/foo/this-is-id", StatusCode::OK),
        (Method::DELETE, "/test/foo/this-is-id", StatusCode::OK),
        (Method::POST, "/test/foo/123/bar", StatusCode::OK),
        (Method::PUT, "/test/foo/123/bar/456", StatusCode::OK),
        (Method::PUT, "/test/foo/123/bar/", StatusCode::OK),
        (Method::GET, "/nope", StatusCode::NOT_FOUND),
    ];

    for (method, path, expected) in cases {
        let (status, _) = send(&router, method.clone(), path).await;
        assert_eq!(status, expected, "{method} {path}");
    }
}

#[tokio::test]
async fn test_params_are_bound_under_route_names() {
    let router = registered_routes();

    let (_, body) = send(&router, Method::GET, "/test").await;
    assert_eq!(body, "/test ");

    let (_, body) = send(&router, Method::PUT, "/test/foo/fooID").await;
    assert_eq!(body, "/test/foo/:id id=fooID");

    let (_, body) = send(&router, Method::GET, "/test/foo/fooID").await;
    assert_eq!(body, "/test/foo/{blah} blah=fooID");

    let (_, body) = send(&router, Method::GET, "/test/foo/123/bar/456").await;
    assert_eq!(body, "/test/foo/:id/bar/:barID barID=456,id=123");

    let (_, body) = send(&router, Method::PUT, "/test/foo/123/bar/").await;
    assert_eq!(body, "/test/foo/:id/bar/:barID barID=,id=123");
}

#[tokio::test]
async fn test_params_are_percent_decoded() {
    let router = registered_routes();

    let (status, body) = send(&router, Method::PUT, "/test/foo/hello%20world").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "/test/foo/:id id=hello world");

    let matched = router.lookup(&Method::GET, "/test/foo/caf%C3%A9/bar/x%2Fy").unwrap();
    assert_eq!(matched.params.get("id"), Some("café"));
    assert_eq!(matched.params.get("barID"), Some("x/y"));
}

#[tokio::test]
async fn test_literal_preferred_over_wildcard() {
    let router = Router::new();
    router.any("/test/foo", text("a")).unwrap();
    router.any("/test/foo/bar", text("b")).unwrap();
    router.any("/test/:foo/bar", text("c")).unwrap();
    router.any("/test/:foo/:bar", text("d")).unwrap();
    router.any("/:any", text("e")).unwrap();

    let cases = [
        ("/test/foo", "a"),
        ("/test/foo/bar", "b"),
        ("/test/blah/bar", "c"),
        ("/test/some/bar", "c"),
        ("/test/some/baz", "d"),
        ("/test/fo/baz", "d"),
        ("/test/fooo/baz", "d"),
        ("/a", "e"),
        ("/testa", "e"),
    ];
    for (path, expected) in cases {
        let (status, body) = send(&router, Method::GET, path).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(body, expected, "{path}");
    }

    // Greedy: the literal `foo` branch has no `baz`, and there is no
    // backtracking into the wildcard.
    let (status, _) = send(&router, Method::GET, "/test/foo/baz").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_insertion_order_does_not_change_matching() {
    let wildcard_first = Router::new();
    wildcard_first.get("/users/:id", text("param")).unwrap();
    wildcard_first.get("/users/me", text("me")).unwrap();

    let literal_first = Router::new();
    literal_first.get("/users/me", text("me")).unwrap();
    literal_first.get("/users/:id", text("param")).unwrap();

    for router in [&wildcard_first, &literal_first] {
        assert_eq!(send(router, Method::GET, "/users/me").await.1, "me");
        assert_eq!(send(router, Method::GET, "/users/42").await.1, "param");
    }
}

#[test]
fn test_strict_rejects_duplicates_and_renamed_wildcards() {
    let router = Router::new();
    router.get("/items/:id", text("one")).unwrap();

    let err = router.get("/items/:id", text("two")).unwrap_err();
    assert!(matches!(err, RouteError::DuplicateRegistration { .. }));

    let err = router.get("/items/:name", text("two")).unwrap_err();
    assert!(matches!(err, RouteError::DuplicateRegistration { .. }));

    let matched = router.lookup(&Method::GET, "/items/7").unwrap();
    assert_eq!(matched.pattern, "/items/:id");
    assert_eq!(matched.params.get("id"), Some("7"));
}

#[tokio::test]
async fn test_lenient_last_registration_wins() {
    let router = Router::builder().policy(RegistrationPolicy::Lenient).build();
    router.get("/items/:id", text("one")).unwrap();
    router.get("/items/:name", text("two")).unwrap();

    assert_eq!(send(&router, Method::GET, "/items/7").await.1, "two");
    let matched = router.lookup(&Method::GET, "/items/7").unwrap();
    assert_eq!(matched.params.get("name"), Some("7"));
    assert_eq!(matched.params.get("id"), None);
}

#[test]
fn test_strict_any_is_all_or_nothing() {
    let router = Router::new();
    router.patch("/things", text("patch")).unwrap();

    assert!(router.any("/things", text("any")).is_err());
    assert!(router.lookup(&Method::GET, "/things").is_none());
    assert!(router.lookup(&Method::PATCH, "/things").is_some());
}

#[test]
fn test_lookup_is_deterministic() {
    let router = Router::new();
    router.get("/a/:x/c", text("1")).unwrap();
    router.get("/a/b/:y", text("2")).unwrap();

    for _ in 0..100 {
        let matched = router.lookup(&Method::GET, "/a/b/c").unwrap();
        assert_eq!(matched.pattern, "/a/b/:y");
        assert_eq!(matched.params.get("y"), Some("c"));
    }
}

#[test]
fn test_concurrent_registration_and_lookup() {
    let router = Arc::new(Router::new());
    router.get("/static", text("static")).unwrap();

    thread::scope(|scope| {
        let writer = Arc::clone(&router);
        scope.spawn(move || {
            for i in 0..200 {
                writer
                    .get(&format!("/burst/{i}/leaf/:id"), text("burst"))
                    .unwrap();
            }
        });

        for _ in 0..4 {
            let reader = Arc::clone(&router);
            scope.spawn(move || {
                for i in 0..200 {
                    assert!(reader.lookup(&Method::GET, "/static").is_some());
                    if let Some(matched) = reader.lookup(&Method::GET, &format!("/burst/{i}/leaf/x{i}")) {
                        assert_eq!(matched.pattern, format!("/burst/{i}/leaf/:id"));
                        assert_eq!(matched.params.get("id"), Some(format!("x{i}").as_str()));
                    }
                }
            });
        }
    });

    for i in 0..200 {
        assert!(router.lookup(&Method::GET, &format!("/burst/{i}/leaf/7")).is_some());
    }
}

#[test]
fn test_concurrent_registration_under_shared_prefix() {
    let router = Arc::new(Router::new());
    router.get("/shared/:id", text("wildcard")).unwrap();

    thread::scope(|scope| {
        let literals = Arc::clone(&router);
        scope.spawn(move || {
            for i in 0..200 {
                literals.get(&format!("/shared/{i}"), text("literal")).unwrap();
                literals
                    .get(&format!("/shared/{i}/leaf/:id"), text("leaf"))
                    .unwrap();
            }
        });

        let wildcards = Arc::clone(&router);
        scope.spawn(move || {
            for i in 0..200 {
                wildcards
                    .get(&format!("/shared/:id/t{i}"), text("tail"))
                    .unwrap();
            }
        });

        for _ in 0..4 {
            let reader = Arc::clone(&router);
            scope.spawn(move || {
                for i in 0..200 {
                    let matched = reader.lookup(&Method::GET, &format!("/shared/{i}")).unwrap();
                    if matched.pattern == "/shared/:id" {
                        assert_eq!(matched.params.get("id"), Some(i.to_string().as_str()));
                    } else {
                        assert_eq!(matched.pattern, format!("/shared/{i}"));
                        assert!(matched.params.is_empty());
                    }

                    if let Some(matched) = reader.lookup(&Method::GET, &format!("/shared/{i}/leaf/z")) {
                        assert_eq!(matched.pattern, format!("/shared/{i}/leaf/:id"));
                        assert_eq!(matched.params.get("id"), Some("z"));
                    }

                    if let Some(matched) = reader.lookup(&Method::GET, &format!("/shared/w{i}/t{i}")) {
                        assert_eq!(matched.pattern, format!("/shared/:id/t{i}"));
                        assert_eq!(matched.params.get("id"), Some(format!("w{i}").as_str()));
                    }
                }
            });
        }
    });

    for i in 0..200 {
        assert_eq!(
            router.lookup(&Method::GET, &format!("/shared/{i}")).unwrap().pattern,
            format!("/shared/{i}")
        );
        assert!(router.lookup(&Method::GET, &format!("/shared/{i}/leaf/z")).is_some());
        assert!(router.lookup(&Method::GET, &format!("/shared/w{i}/t{i}")).is_some());
    }
}
