//! AWS SigV4 signing for HTTP clients.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI args ─┐
//!   env ──────┼──▶ config ──▶ RequestConfig
//!   *.toml ───┘                   │
//!                    ┌────────────┴─────────────┐
//!                    ▼                          ▼
//!             single request              reverse proxy
//!              (http::client)           (proxy::server)
//!                    │                          │
//!                    └──────────┬───────────────┘
//!                               ▼
//!                   signing::SigningTransport
//!                    (hash payload, sign)
//!                               │
//!                               ▼
//!                    hyper client ──▶ AWS endpoint
//! ```

pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod http;
pub mod observability;
pub mod proxy;
pub mod signing;

pub use config::RequestConfig;
pub use error::{Error, Result};
pub use proxy::{ProxyServer, ReverseProxy};
pub use signing::{SigningContext, SigningLayer, SigningTransport};
