//! SigV4 signing transport.
//!
//! [`SigningTransport`] wraps any `tower::Service` that sends HTTP requests
//! and signs each request before handing it over. It can be used wherever an
//! unsigned transport is expected.
//!
//! Per request, in order:
//! 1. signer, service and region must be configured (region may come from
//!    `AWS_REGION`)
//! 2. a request already carrying an `AWS4*` authorization is forwarded as-is
//! 3. the uri is forced to https (a relative uri takes its authority from
//!    `Host`) and `%2C` in the path becomes a literal comma
//! 4. `X-Forwarded-*` headers are dropped, AWS rejects them on signed requests
//! 5. `Date` is stamped with the signing time
//! 6. the body is hashed and replaced by an identical buffered body
//! 7. the signer attaches the signature headers

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use http::header::{AUTHORIZATION, DATE, HOST};
use http::uri::{Authority, PathAndQuery, Scheme};
use http::{HeaderMap, HeaderValue, Request, Response, Uri};
use tower::{Layer, Service};

use crate::error::{BoxError, Error, Result};
use crate::signing::payload::hash_payload;
use crate::signing::signer::SigningContext;

/// Headers AWS refuses on signed requests.
const FORWARDED_HEADERS: [&str; 4] = [
    "x-forwarded-for",
    "x-forwarded-host",
    "x-forwarded-port",
    "x-forwarded-proto",
];

/// Layer that wraps a transport in a [`SigningTransport`].
#[derive(Debug, Clone)]
pub struct SigningLayer {
    ctx: Arc<SigningContext>,
}

impl SigningLayer {
    /// Create a layer sharing `ctx` between every transport it builds.
    pub fn new(ctx: SigningContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }
}

impl<S> Layer<S> for SigningLayer {
    type Service = SigningTransport<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SigningTransport {
            inner,
            ctx: self.ctx.clone(),
        }
    }
}

/// Transport that signs requests before delegating to `inner`.
#[derive(Debug, Clone)]
pub struct SigningTransport<S> {
    inner: S,
    ctx: Arc<SigningContext>,
}

impl<S> SigningTransport<S> {
    /// Wrap `inner` with signing.
    pub fn new(inner: S, ctx: SigningContext) -> Self {
        Self {
            inner,
            ctx: Arc::new(ctx),
        }
    }
}

impl<S, ResBody> Service<Request<Body>> for SigningTransport<S>
where
    S: Service<Request<Body>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError>,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner
            .poll_ready(cx)
            .map_err(|e| Error::Transport(e.into()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let ctx = self.ctx.clone();
        // The readied service must be the one that gets called.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let req = sign_request(&ctx, req).await?;
            inner.call(req).await.map_err(|e| Error::Transport(e.into()))
        })
    }
}

/// Sign `req` according to `ctx`, returning the request to send.
pub async fn sign_request(ctx: &SigningContext, req: Request<Body>) -> Result<Request<Body>> {
    let (signer, service, region) = ctx.resolve()?;

    if is_signed(req.headers()) {
        tracing::debug!(uri = %req.uri(), "Request already signed, forwarding unchanged");
        return Ok(req);
    }

    let (mut parts, body) = req.into_parts();

    parts.uri = normalize_uri(&parts.uri, &parts.headers)?;
    for name in FORWARDED_HEADERS {
        parts.headers.remove(name);
    }

    let time = signing_time();
    let date = HeaderValue::from_str(&time.to_rfc3339_opts(SecondsFormat::Secs, true))
        .map_err(|e| Error::Signing(e.into()))?;
    parts.headers.insert(DATE, date);

    let (payload, body) = hash_payload(body).await?;

    tracing::debug!(
        method = %parts.method,
        uri = %parts.uri,
        service = %service,
        region = %region,
        payload = %payload,
        "Signing request"
    );

    signer
        .sign(&mut parts, &payload, service, &region, time)
        .await
        .map_err(Error::Signing)?;

    Ok(Request::from_parts(parts, body))
}

/// Whether the first `Authorization` value is already a SigV4 signature.
fn is_signed(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .is_some_and(|v| v.as_bytes().starts_with(b"AWS4"))
}

/// Current time truncated to whole seconds, so the `Date` header and the
/// signer agree exactly.
fn signing_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

fn normalize_uri(uri: &Uri, headers: &HeaderMap) -> Result<Uri> {
    let mut parts = uri.clone().into_parts();

    if parts.authority.is_none() {
        parts.authority = headers
            .get(HOST)
            .and_then(|v| Authority::try_from(v.as_bytes()).ok());
    }
    // A bare path with no Host stays relative and is signed as-is.
    if parts.authority.is_some() {
        parts.scheme = Some(Scheme::HTTPS);
    }

    if let Some(pq) = parts.path_and_query.as_ref() {
        if pq.path().contains("%2C") {
            let path = unescape_commas(pq.path());
            let rebuilt = match pq.query() {
                Some(query) => format!("{path}?{query}"),
                None => path,
            };
            let pq = PathAndQuery::try_from(rebuilt).map_err(|e| Error::InvalidUri(e.into()))?;
            parts.path_and_query = Some(pq);
        }
    }

    Uri::from_parts(parts).map_err(|e| Error::InvalidUri(e.into()))
}

/// Turn `%2C` into `,`, leaving every other byte and escape alone.
fn unescape_commas(path: &str) -> String {
    path.replace("%2C", ",")
}
