//! Reverse proxy adapter.
//!
//! # Responsibilities
//! - Rewrite inbound requests onto the configured endpoint
//! - Strip hop-by-hop headers in both directions
//! - Record the client address in `X-Forwarded-For`
//! - Pin `Host` to the endpoint hostname when signing
//! - Relay through the (possibly signing) transport
//!
//! # Design Decisions
//! - Upstream failures of any kind become `502 Bad Gateway`
//! - `X-Forwarded-For` is added here and removed again by the signing
//!   transport, so it only reaches unsigned upstreams

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use http::header::{CONNECTION, HOST};
use http::uri::PathAndQuery;
use http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode, Uri};
use tower::ServiceExt;

use crate::http::client::{build_transport, HttpTransport};
use crate::signing::SigningContext;

/// Headers that apply to a single connection and are never forwarded.
const HOP_BY_HOP_HEADERS: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Relays every inbound request to a single upstream endpoint.
#[derive(Clone)]
pub struct ReverseProxy {
    target: Uri,
    transport: HttpTransport,
    host: Option<HeaderValue>,
}

impl ReverseProxy {
    /// Plain proxy to `target`; the inbound `Host` header is kept.
    pub fn new(target: Uri, transport: HttpTransport) -> Self {
        Self {
            target,
            transport,
            host: None,
        }
    }

    /// Proxy to `target`, signing every request sent through `base`.
    ///
    /// Signing with the client's `Host` would produce signatures for the
    /// wrong host, so `Host` is pinned to the endpoint hostname.
    pub fn signed(target: Uri, base: HttpTransport, ctx: SigningContext) -> Self {
        let host = target
            .host()
            .and_then(|h| HeaderValue::from_str(h).ok());
        Self {
            transport: build_transport(base, Some(ctx)),
            target,
            host,
        }
    }

    /// [`ReverseProxy::signed`] when `signing` is set, otherwise
    /// [`ReverseProxy::new`].
    pub fn with_signing(target: Uri, base: HttpTransport, signing: Option<SigningContext>) -> Self {
        match signing {
            Some(ctx) => Self::signed(target, base, ctx),
            None => Self::new(target, base),
        }
    }

    /// The upstream endpoint.
    pub fn target(&self) -> &Uri {
        &self.target
    }

    /// Axum router sending every path and method to this proxy.
    pub fn router(self) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(self)
    }

    /// Rewrite `req` in place for the upstream.
    pub fn rewrite(&self, req: &mut Request<Body>, client: Option<SocketAddr>) -> Result<(), http::Error> {
        let mut parts = req.uri().clone().into_parts();
        parts.scheme = self.target.scheme().cloned();
        parts.authority = self.target.authority().cloned();

        let path = join_paths(self.target.path(), req.uri().path());
        let query = join_queries(self.target.query(), req.uri().query());
        let pq = match query {
            Some(q) => format!("{path}?{q}"),
            None => path,
        };
        parts.path_and_query = Some(PathAndQuery::try_from(pq)?);
        *req.uri_mut() = Uri::from_parts(parts)?;

        strip_hop_by_hop(req.headers_mut());

        if let Some(addr) = client {
            append_forwarded_for(req.headers_mut(), addr);
        }

        if let Some(host) = &self.host {
            req.headers_mut().insert(HOST, host.clone());
        }
        Ok(())
    }

    /// Relay one request, always producing a response.
    pub async fn forward(&self, mut req: Request<Body>, client: Option<SocketAddr>) -> Response {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        if let Err(e) = self.rewrite(&mut req, client) {
            tracing::warn!(method = %method, path = %path, error = %e, "Rejecting request");
            return (StatusCode::BAD_REQUEST, "Invalid request").into_response();
        }

        tracing::debug!(method = %method, path = %path, upstream = %req.uri(), "Proxying request");

        match self.transport.clone().oneshot(req).await {
            Ok(mut res) => {
                strip_hop_by_hop(res.headers_mut());
                res.into_response()
            }
            Err(e) => {
                tracing::error!(method = %method, path = %path, error = %e, "Upstream error");
                (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
            }
        }
    }
}

async fn proxy_handler(State(proxy): State<ReverseProxy>, request: Request<Body>) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    proxy.forward(request, client).await
}

/// Join two paths with exactly one slash between them.
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

fn join_queries(base: Option<&str>, query: Option<&str>) -> Option<String> {
    match (base.filter(|q| !q.is_empty()), query.filter(|q| !q.is_empty())) {
        (Some(b), Some(q)) => Some(format!("{b}&{q}")),
        (Some(q), None) | (None, Some(q)) => Some(q.to_string()),
        (None, None) => None,
    }
}

/// Remove hop-by-hop headers, including any named by `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, addr: SocketAddr) {
    let ip = addr.ip().to_string();
    let prior: Vec<&str> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let value = if prior.is_empty() {
        ip
    } else {
        format!("{}, {}", prior.join(", "), ip)
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
