//! The signer capability and the per-process signing context.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::env::{Env, OsEnv, AWS_REGION};
use crate::error::{Error, Result};
use crate::signing::payload::PayloadDigest;

/// Computes a SigV4 signature and attaches it to a request head.
///
/// Implementations must add at least an `Authorization` header. The payload
/// digest and signing time are supplied by the caller and must be used as-is.
#[async_trait]
pub trait Signer: Debug + Send + Sync + 'static {
    /// Sign `req` in place.
    async fn sign(
        &self,
        req: &mut http::request::Parts,
        payload: &PayloadDigest,
        service: &str,
        region: &str,
        time: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}

/// Everything the signing transport needs besides the request.
///
/// Built once at startup and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct SigningContext {
    signer: Option<Arc<dyn Signer>>,
    service: String,
    region: String,
    env: Arc<dyn Env>,
}

impl SigningContext {
    /// Create a context around `signer`.
    pub fn new(signer: impl Signer, service: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            signer: Some(Arc::new(signer)),
            service: service.into(),
            region: region.into(),
            env: Arc::new(OsEnv),
        }
    }

    /// Create a context from an optional, already shared signer.
    pub fn from_parts(
        signer: Option<Arc<dyn Signer>>,
        service: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            signer,
            service: service.into(),
            region: region.into(),
            env: Arc::new(OsEnv),
        }
    }

    /// Replace the environment consulted when the region is empty.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// The configured service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The configured region, without the environment fallback.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Check preconditions in signer, service, region order.
    ///
    /// An empty region falls back to `AWS_REGION`.
    pub(crate) fn resolve(&self) -> Result<(&dyn Signer, &str, String)> {
        let signer = self.signer.as_deref().ok_or(Error::MissingSigner)?;
        if self.service.is_empty() {
            return Err(Error::MissingService);
        }

        let region = if self.region.is_empty() {
            self.env.non_empty(AWS_REGION).ok_or(Error::MissingRegion)?
        } else {
            self.region.clone()
        };

        Ok((signer, &self.service, region))
    }
}
