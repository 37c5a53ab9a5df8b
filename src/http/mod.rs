//! Outbound HTTP.
//!
//! Every request leaves through an [`HttpTransport`]: the pooled hyper
//! client, optionally wrapped by the signing layer.

pub mod client;

pub use client::{build_request, build_transport, default_transport, send, HttpTransport};
