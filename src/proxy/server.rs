//! HTTP server hosting the reverse proxy.
//!
//! # Responsibilities
//! - Wrap the proxy router with request tracing
//! - Bind and serve with client address info
//! - Stop accepting on Ctrl+C and drain in-flight requests

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::proxy::reverse_proxy::ReverseProxy;

/// HTTP server for the reverse proxy.
pub struct ProxyServer {
    router: Router,
}

impl ProxyServer {
    /// Create a server relaying through `proxy`.
    pub fn new(proxy: ReverseProxy) -> Self {
        let router = proxy.router().layer(TraceLayer::new_for_http());
        Self { router }
    }

    /// Bind `0.0.0.0:port`.
    pub async fn bind(port: u16) -> std::io::Result<TcpListener> {
        TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await
    }

    /// Serve until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> std::io::Result<()> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Reverse proxy listening");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Reverse proxy stopped");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
