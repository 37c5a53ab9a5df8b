//! AWS SigV4 request signing.
//!
//! # Data Flow
//! ```text
//! outbound request
//!     → transport.rs (preconditions, uri normalization, header hygiene)
//!     → payload.rs (hash body, replace with replayable copy)
//!     → signer.rs (Signer capability: attach signature headers)
//!     → wrapped transport (actual network send)
//! ```
//!
//! # Design Decisions
//! - Signing is a `tower::Layer`, so any HTTP client service can be wrapped
//! - The signer is a trait; `sigv4.rs` provides the `aws-sigv4` backed default
//! - Credentials come from a provider chain (`credentials.rs`), not a fixed set
//! - Configuration is read once into a [`SigningContext`] and never mutated

pub mod credentials;
pub mod payload;
pub mod signer;
pub mod sigv4;
pub mod transport;

pub use payload::{hash_payload, PayloadDigest, EMPTY_STRING_SHA256};
pub use signer::{Signer, SigningContext};
pub use credentials::{default_credentials_provider, default_region, load_env_credentials, EnvCredentials};
pub use sigv4::{CredentialSummary, SigV4Signer};
pub use transport::{sign_request, SigningLayer, SigningTransport};
