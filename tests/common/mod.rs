//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aws_signing::error::BoxError;
use aws_signing::http::HttpTransport;
use aws_signing::signing::{PayloadDigest, Signer};
use axum::body::Body;
use axum::routing::any;
use axum::Router;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{AUTHORIZATION, HOST};
use http::{HeaderMap, Request, Response, Uri};
use http_body_util::BodyExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::util::BoxCloneSyncService;

/// What the stub signer saw.
#[derive(Debug, Clone)]
pub struct SignCall {
    pub payload: String,
    pub service: String,
    pub region: String,
    pub host: Option<String>,
    pub time: DateTime<Utc>,
}

/// Signer that records its inputs and attaches a recognizable signature.
#[derive(Debug, Default, Clone)]
pub struct StubSigner {
    pub calls: Arc<Mutex<Vec<SignCall>>>,
}

impl StubSigner {
    pub fn calls(&self) -> Vec<SignCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Signer for StubSigner {
    async fn sign(
        &self,
        req: &mut http::request::Parts,
        payload: &PayloadDigest,
        service: &str,
        region: &str,
        time: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(SignCall {
            payload: payload.to_string(),
            service: service.to_string(),
            region: region.to_string(),
            host: req
                .headers
                .get(HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            time,
        });
        let auth = format!("AWS4-HMAC-SHA256 Credential=STUB/{region}/{service}/aws4_request");
        req.headers.insert(AUTHORIZATION, auth.parse()?);
        Ok(())
    }
}

/// A request as seen by the transport.
#[derive(Debug, Clone)]
pub struct Sent {
    pub method: String,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub type Recorder = Arc<Mutex<Vec<Sent>>>;

/// In-memory transport that records requests and answers `200 ok`.
pub fn recording_transport() -> (HttpTransport, Recorder) {
    let recorder = Recorder::default();
    let recorded = recorder.clone();
    let service = tower::service_fn(move |req: Request<Body>| {
        let recorded = recorded.clone();
        async move {
            let (parts, body) = req.into_parts();
            let body = body.collect().await?.to_bytes();
            recorded.lock().unwrap().push(Sent {
                method: parts.method.to_string(),
                uri: parts.uri,
                headers: parts.headers,
                body,
            });
            Ok::<_, BoxError>(Response::new(Body::from("ok")))
        }
    });
    (BoxCloneSyncService::new(service), recorder)
}

/// Start an upstream that echoes what it received as JSON.
pub async fn start_echo_upstream() -> SocketAddr {
    async fn echo(req: Request<Body>) -> Response<Body> {
        let (parts, body) = req.into_parts();
        let body = body.collect().await.unwrap().to_bytes();
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let echoed = serde_json::json!({
            "method": parts.method.as_str(),
            "uri": parts.uri.to_string(),
            "host": header("host"),
            "x_forwarded_for": header("x-forwarded-for"),
            "authorization": header("authorization"),
            "body": String::from_utf8_lossy(&body),
        });
        Response::builder()
            .header("content-type", "application/json")
            .header("keep-alive", "timeout=5")
            .body(Body::from(echoed.to_string()))
            .unwrap()
    }

    let app = Router::new()
        .route("/", any(echo))
        .route("/{*path}", any(echo));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Bind an ephemeral local port for a proxy under test.
pub async fn local_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Shutdown trigger for a server started with `run_until`.
pub fn shutdown_pair() -> (oneshot::Sender<()>, impl std::future::Future<Output = ()> + Send + 'static) {
    let (tx, rx) = oneshot::channel::<()>();
    (tx, async move {
        let _ = rx.await;
    })
}
