//! Reverse proxy behavior, in-memory and over the network.

mod common;

use aws_signing::env::StaticEnv;
use aws_signing::http::default_transport;
use aws_signing::proxy::{ProxyServer, ReverseProxy};
use aws_signing::signing::SigningContext;
use axum::body::Body;
use http::header::{AUTHORIZATION, HOST};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use sha2::{Digest, Sha256};
use tower::ServiceExt;

use common::{local_listener, recording_transport, shutdown_pair, start_echo_upstream, StubSigner};

#[tokio::test]
async fn test_signed_proxy_pins_host_and_hashes_body() {
    let signer = StubSigner::default();
    let (base, recorder) = recording_transport();
    let ctx = SigningContext::new(signer.clone(), "es", "us-east-1").with_env(StaticEnv::default());
    let proxy = ReverseProxy::signed(
        "https://search.example.internal".parse().unwrap(),
        base,
        ctx,
    );

    let req = Request::builder()
        .method(Method::POST)
        .uri("/docs/_bulk")
        .header(HOST, "localhost:9200")
        .header("x-forwarded-for", "10.0.0.1")
        .body(Body::from(r#"{"a":1}"#))
        .unwrap();
    let res = proxy.router().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let calls = signer.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].host.as_deref(), Some("search.example.internal"));
    assert_eq!(
        calls[0].payload,
        hex::encode(Sha256::digest(br#"{"a":1}"#))
    );

    let sent = recorder.lock().unwrap().clone();
    assert_eq!(sent[0].uri, "https://search.example.internal/docs/_bulk");
    assert_eq!(&sent[0].body[..], br#"{"a":1}"#);
    assert!(sent[0].headers.get("x-forwarded-for").is_none());
    assert!(sent[0].headers.contains_key(AUTHORIZATION));
}

#[tokio::test]
async fn test_signing_failure_is_bad_gateway() {
    let signer = StubSigner::default();
    let (base, recorder) = recording_transport();
    let ctx = SigningContext::new(signer, "es", "").with_env(StaticEnv::default());
    let proxy = ReverseProxy::signed("https://search.example.internal".parse().unwrap(), base, ctx);

    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let res = proxy.router().oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert!(recorder.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unsigned_proxy_passthrough() {
    let upstream = start_echo_upstream().await;
    let proxy = ReverseProxy::new(
        format!("http://{upstream}").parse().unwrap(),
        default_transport().unwrap(),
    );

    let (listener, addr) = local_listener().await;
    let (stop, shutdown) = shutdown_pair();
    let server = tokio::spawn(ProxyServer::new(proxy).run_until(listener, shutdown));

    let res = reqwest::Client::new()
        .post(format!("http://{addr}/index/_doc?refresh=true"))
        .header("host", "search.local")
        .body(r#"{"a":1}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert!(res.headers().get("keep-alive").is_none());

    let echoed: serde_json::Value = serde_json::from_str(&res.text().await.unwrap()).unwrap();
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["uri"], "/index/_doc?refresh=true");
    assert_eq!(echoed["host"], "search.local");
    assert_eq!(echoed["x_forwarded_for"], "127.0.0.1");
    assert_eq!(echoed["authorization"], serde_json::Value::Null);
    assert_eq!(echoed["body"], r#"{"a":1}"#);

    let _ = stop.send(());
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let (dead, dead_addr) = local_listener().await;
    drop(dead);

    let proxy = ReverseProxy::new(
        format!("http://{dead_addr}").parse().unwrap(),
        default_transport().unwrap(),
    );
    let req = Request::builder().uri("/_cluster/health").body(Body::empty()).unwrap();
    let res = proxy.router().oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Upstream request failed");
}
