//! Default [`Signer`] backed by the `aws-sigv4` crate.

use std::fmt;
use std::time::SystemTime;

use async_trait::async_trait;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use chrono::{DateTime, Utc};
use http::{HeaderName, HeaderValue};

use crate::signing::payload::PayloadDigest;
use crate::signing::signer::Signer;

/// SigV4 header signer.
///
/// Credentials are fetched from the provider on every request, so rotating
/// role credentials are picked up.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    provider: SharedCredentialsProvider,
}

impl SigV4Signer {
    /// Create a signer backed by `provider`.
    pub fn new(provider: impl ProvideCredentials + 'static) -> Self {
        Self {
            provider: SharedCredentialsProvider::new(provider),
        }
    }

    /// Resolve the current credentials.
    pub async fn credentials(&self) -> Result<Credentials, CredentialsError> {
        self.provider.provide_credentials().await
    }
}

#[async_trait]
impl Signer for SigV4Signer {
    async fn sign(
        &self,
        req: &mut http::request::Parts,
        payload: &PayloadDigest,
        service: &str,
        region: &str,
        time: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let identity: Identity = self.credentials().await?.into();
        let params = v4::SigningParams::builder()
            .identity(&identity)
            .region(region)
            .name(service)
            .time(SystemTime::from(time))
            .settings(SigningSettings::default())
            .build()?
            .into();

        let uri = req.uri.to_string();
        let headers = req
            .headers
            .iter()
            .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?)));
        let signable = SignableRequest::new(
            req.method.as_str(),
            uri.as_str(),
            headers,
            SignableBody::Precomputed(payload.to_string()),
        )?;

        let (instructions, _signature) = sign(signable, &params)?.into_parts();
        for (name, value) in instructions.headers() {
            req.headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
        Ok(())
    }
}

/// Display adapter that redacts credential secrets.
pub struct CredentialSummary<'a>(&'a Credentials);

impl<'a> CredentialSummary<'a> {
    pub fn new(credentials: &'a Credentials) -> Self {
        Self(credentials)
    }
}

impl fmt::Display for CredentialSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "access_key_id={} secret_access_key=** session_token={}",
            redact(self.0.access_key_id()),
            if self.0.session_token().is_some() { "**" } else { "<none>" },
        )
    }
}

/// Keep the first and last three characters of longer values.
fn redact(value: &str) -> String {
    let len = value.chars().count();
    if len <= 12 {
        return "*".repeat(len);
    }
    let head: String = value.chars().take(3).collect();
    let tail: String = value.chars().skip(len - 3).collect();
    format!("{head}***{tail}")
}
