//! Payload hashing.
//!
//! SigV4 needs the hex encoded SHA-256 of the payload, even when there is no
//! payload. Network bodies can only be read once, so a present body is
//! buffered, hashed, and handed back as a fresh body over the same bytes.

use std::fmt;

use axum::body::Body;
use bytes::Bytes;
use http_body::Body as _;
use http_body_util::BodyExt;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// SHA-256 of the empty string.
pub const EMPTY_STRING_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Lowercase hex SHA-256 of a request payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PayloadDigest(String);

impl PayloadDigest {
    /// Digest of an absent payload.
    pub fn empty() -> Self {
        Self(EMPTY_STRING_SHA256.to_string())
    }

    /// Digest of `content`.
    pub fn of(content: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(content).as_slice()))
    }

    /// The 64 character hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PayloadDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash `body` without losing it.
///
/// Returns the digest and the body the caller must install in place of the
/// original. A body that is already at end of stream is treated as absent and
/// returned untouched.
pub async fn hash_payload(body: Body) -> Result<(PayloadDigest, Body)> {
    if body.is_end_stream() {
        return Ok((PayloadDigest::empty(), body));
    }

    let buffered: Bytes = body
        .collect()
        .await
        .map_err(|e| Error::BodyRead(e.into()))?
        .to_bytes();

    let digest = PayloadDigest::of(&buffered);
    Ok((digest, Body::from(buffered)))
}
