//! Signing reverse proxy.
//!
//! # Data Flow
//! ```text
//! client request
//!     → server.rs (axum, tracing, client address)
//!     → reverse_proxy.rs (rewrite onto endpoint, header hygiene)
//!     → signing transport (when enabled)
//!     → upstream endpoint
//! ```

pub mod reverse_proxy;
pub mod server;

pub use reverse_proxy::ReverseProxy;
pub use server::ProxyServer;
