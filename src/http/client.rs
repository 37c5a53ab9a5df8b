//! Outbound HTTP transport and the single-request path.

use axum::body::Body;
use http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use tower::util::BoxCloneSyncService;
use tower::{Layer, ServiceBuilder, ServiceExt};

use crate::config::{RequestBody, RequestConfig};
use crate::error::BoxError;
use crate::signing::{SigningContext, SigningLayer};

/// Type-erased transport shared by the request and proxy paths.
pub type HttpTransport = BoxCloneSyncService<Request<Body>, Response<Body>, BoxError>;

/// Pooled hyper client speaking http and https (webpki roots, ring).
pub fn default_transport() -> Result<HttpTransport, rustls::Error> {
    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())?
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();
    let client: Client<_, Body> = Client::builder(TokioExecutor::new()).build(https);

    let service = ServiceBuilder::new()
        .map_err(BoxError::from)
        .map_response(|res: Response<Incoming>| res.map(Body::new))
        .service(client);
    Ok(BoxCloneSyncService::new(service))
}

/// Wrap `base` in a signing transport when `signing` is set.
pub fn build_transport(base: HttpTransport, signing: Option<SigningContext>) -> HttpTransport {
    match signing {
        Some(ctx) => {
            let signed = SigningLayer::new(ctx)
                .layer(base)
                .map_err(BoxError::from);
            BoxCloneSyncService::new(signed)
        }
        None => base,
    }
}

/// Build the outbound request described by `config`.
pub fn build_request(config: &RequestConfig) -> anyhow::Result<Request<Body>> {
    let url = config
        .request_url
        .clone()
        .ok_or_else(|| anyhow::anyhow!("no request url configured"))?;

    let body = match &config.body {
        RequestBody::Empty => Body::empty(),
        RequestBody::Literal(data) => Body::from(data.clone()),
        RequestBody::Stdin => Body::from_stream(ReaderStream::new(tokio::io::stdin())),
    };

    let mut req = Request::builder()
        .method(config.method.clone())
        .uri(url)
        .body(body)?;
    req.headers_mut().extend(config.headers.clone());
    Ok(req)
}

/// Send `req` and stream the response body to `out`.
///
/// The status is returned, not checked: an error response still has a body
/// worth printing.
pub async fn send<W>(
    transport: HttpTransport,
    req: Request<Body>,
    out: &mut W,
) -> anyhow::Result<StatusCode>
where
    W: AsyncWrite + Unpin,
{
    tracing::info!(method = %req.method(), url = %req.uri(), "Sending request");

    let res = transport
        .oneshot(req)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    let status = res.status();
    tracing::debug!(status = %status, "Response received");

    let mut body = res.into_body();
    while let Some(frame) = body.frame().await {
        if let Ok(data) = frame?.into_data() {
            out.write_all(&data).await?;
        }
    }
    out.flush().await?;
    Ok(status)
}
