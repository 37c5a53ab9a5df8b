//! Errors raised while signing and relaying a request.
//!
//! Every variant is terminal for the request that produced it. Nothing here
//! is retried: signing either completes before the network call or the call
//! never happens.

use thiserror::Error;

/// Boxed error used for body and transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for signing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the signing transport.
#[derive(Debug, Error)]
pub enum Error {
    /// No signer capability was configured.
    #[error("signer is required to perform http request")]
    MissingSigner,

    /// The AWS service name is empty.
    #[error("aws service is required to perform http request")]
    MissingService,

    /// The AWS region is empty and no `AWS_REGION` override exists.
    #[error("aws region is required to perform http request")]
    MissingRegion,

    /// The request body could not be buffered for hashing.
    #[error("error reading http body to sign: {0}")]
    BodyRead(#[source] BoxError),

    /// The signer reported a failure.
    #[error("error signing request: {0}")]
    Signing(#[source] anyhow::Error),

    /// The request URI could not be normalized for signing.
    #[error("invalid request uri: {0}")]
    InvalidUri(#[source] http::Error),

    /// The base transport failed.
    #[error(transparent)]
    Transport(BoxError),
}

impl Error {
    /// Whether the request was rejected before reaching the base transport.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::MissingSigner | Error::MissingService | Error::MissingRegion
        )
    }
}
