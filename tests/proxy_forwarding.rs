//! End-to-end proxy behavior against a local echo backend.

use axum::http::StatusCode;
use dev_proxy::config::ProxyRule;
use dev_proxy::DevServerConfig;
use serde_json::Value;

mod common;

fn config_with(prefix: &str, rule: ProxyRule) -> DevServerConfig {
    let mut config = DevServerConfig::default();
    config.proxy.insert(prefix.into(), rule);
    config
}

#[tokio::test]
async fn change_origin_rewrites_host() {
    let backend = common::start_echo_backend("diary").await;
    let server = common::start_dev_server(config_with(
        "/api",
        ProxyRule::new(format!("http://{backend}")).with_change_origin(true),
    ))
    .await;

    let res = common::client()
        .get(server.url("/api/health"))
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-backend"], "diary");

    let echo: Value = res.json().await.unwrap();
    assert_eq!(echo["path"], "/api/health");
    assert_eq!(echo["headers"]["host"], backend.to_string());

    server.shutdown.trigger();
}

#[tokio::test]
async fn host_preserved_without_change_origin() {
    let backend = common::start_echo_backend("diary").await;
    let server = common::start_dev_server(config_with(
        "/api",
        ProxyRule::new(format!("http://{backend}")),
    ))
    .await;

    let echo: Value = common::client()
        .get(server.url("/api/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(echo["headers"]["host"], server.addr.to_string());

    server.shutdown.trigger();
}

#[tokio::test]
async fn post_body_query_and_request_id_forwarded() {
    let backend = common::start_echo_backend("diary").await;
    let server = common::start_dev_server(config_with(
        "/api",
        ProxyRule::new(format!("http://{backend}")).with_change_origin(true),
    ))
    .await;

    let res = common::client()
        .post(server.url("/api/generate?draft=true"))
        .header("content-type", "application/json")
        .header("x-request-id", "req-42")
        .body(r#"{"summary":"reviewed pull requests"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-request-id"], "req-42");

    let echo: Value = res.json().await.unwrap();
    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["path"], "/api/generate");
    assert_eq!(echo["query"], "draft=true");
    assert_eq!(echo["body"], r#"{"summary":"reviewed pull requests"}"#);
    assert_eq!(echo["headers"]["x-request-id"], "req-42");
    assert_eq!(echo["headers"]["content-type"], "application/json");

    server.shutdown.trigger();
}

#[tokio::test]
async fn request_id_generated_when_missing() {
    let backend = common::start_echo_backend("diary").await;
    let server = common::start_dev_server(config_with(
        "/api",
        ProxyRule::new(format!("http://{backend}")),
    ))
    .await;

    let res = common::client().get(server.url("/api/health")).send().await.unwrap();
    let generated = res.headers()["x-request-id"].to_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&generated).is_ok());

    let echo: Value = res.json().await.unwrap();
    assert_eq!(echo["headers"]["x-request-id"], generated.as_str());

    server.shutdown.trigger();
}

#[tokio::test]
async fn longest_prefix_selects_backend() {
    let general = common::start_echo_backend("general").await;
    let auth = common::start_echo_backend("auth").await;

    let mut config = DevServerConfig::default();
    config
        .proxy
        .insert("/api".into(), ProxyRule::new(format!("http://{general}")));
    config
        .proxy
        .insert("/api/auth".into(), ProxyRule::new(format!("http://{auth}")));
    let server = common::start_dev_server(config).await;

    let client = common::client();
    let res = client.get(server.url("/api/auth/login")).send().await.unwrap();
    assert_eq!(res.headers()["x-backend"], "auth");

    let res = client.get(server.url("/api/generate")).send().await.unwrap();
    assert_eq!(res.headers()["x-backend"], "general");

    server.shutdown.trigger();
}

#[tokio::test]
async fn path_rewrite_applied() {
    let backend = common::start_echo_backend("diary").await;
    let mut rule = ProxyRule::new(format!("http://{backend}"));
    rule.path_rewrite.insert("^/api".into(), "".into());
    let server = common::start_dev_server(config_with("/api", rule)).await;

    let echo: Value = common::client()
        .get(server.url("/api/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(echo["path"], "/health");

    server.shutdown.trigger();
}

#[tokio::test]
async fn unmatched_path_is_not_found() {
    let backend = common::start_echo_backend("diary").await;
    let server = common::start_dev_server(config_with(
        "/api",
        ProxyRule::new(format!("http://{backend}")),
    ))
    .await;

    let res = common::client().get(server.url("/dashboard")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.headers().get("x-backend").is_none());

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Not Found");

    server.shutdown.trigger();
}

#[tokio::test]
async fn unreachable_target_is_bad_gateway() {
    let server = common::start_dev_server(config_with("/api", ProxyRule::new("http://127.0.0.1:1"))).await;

    let res = common::client().get(server.url("/api/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Bad Gateway");

    server.shutdown.trigger();
}

#[tokio::test]
async fn slow_target_is_gateway_timeout() {
    let backend = common::start_echo_backend("slow").await;
    let mut config = config_with("/slow", ProxyRule::new(format!("http://{backend}")));
    config.timeouts.request_secs = 1;
    let server = common::start_dev_server(config).await;

    let res = common::client().get(server.url("/slow")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);

    server.shutdown.trigger();
}

#[tokio::test]
async fn redirects_passed_through() {
    let backend = common::start_echo_backend("diary").await;
    let server = common::start_dev_server(config_with(
        "/redirect",
        ProxyRule::new(format!("http://{backend}")),
    ))
    .await;

    let res = common::client().get(server.url("/redirect")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], "/elsewhere");

    server.shutdown.trigger();
}

#[tokio::test]
async fn extra_headers_and_xfwd() {
    let backend = common::start_echo_backend("diary").await;
    let mut rule = ProxyRule::new(format!("http://{backend}"));
    rule.xfwd = true;
    rule.headers.insert("x-api-key".into(), "dev-key".into());
    let server = common::start_dev_server(config_with("/api", rule)).await;

    let echo: Value = common::client()
        .get(server.url("/api/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(echo["headers"]["x-api-key"], "dev-key");
    assert_eq!(echo["headers"]["x-forwarded-for"], "127.0.0.1");
    assert_eq!(echo["headers"]["x-forwarded-proto"], "http");
    assert_eq!(echo["headers"]["x-forwarded-host"], server.addr.to_string());

    server.shutdown.trigger();
}

#[tokio::test]
async fn oversized_chunked_body_is_payload_too_large() {
    let backend = common::start_echo_backend("diary").await;
    let mut config = config_with("/api", ProxyRule::new(format!("http://{backend}")));
    config.limits.max_body_size = 16;
    let server = common::start_dev_server(config).await;

    // A file body has no known length, so it is sent chunked.
    let dir = common::temp_dir("chunked");
    let payload = dir.join("payload.json");
    std::fs::write(&payload, vec![b'x'; 64]).unwrap();
    let file = tokio::fs::File::open(&payload).await.unwrap();

    let res = common::client()
        .post(server.url("/api/generate"))
        .body(file)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(res.headers().get("x-backend").is_none());

    server.shutdown.trigger();
    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn dot_segments_are_not_forwarded() {
    let backend = common::start_echo_backend("diary").await;
    let server = common::start_dev_server(config_with(
        "/api",
        ProxyRule::new(format!("http://{backend}")),
    ))
    .await;

    for path in ["/api/../admin", "/api/%2e%2e/admin", "/api/./health"] {
        assert_eq!(common::raw_get_status(server.addr, path).await, 400, "{path}");
    }
    assert_eq!(common::raw_get_status(server.addr, "/api/health").await, 200);

    server.shutdown.trigger();
}
