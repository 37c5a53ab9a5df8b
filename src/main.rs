//! `aws-signing`: send one SigV4-signed request, or run a signing reverse
//! proxy in front of an AWS endpoint.

use anyhow::Context;
use clap::Parser;

use aws_signing::cli::Cli;
use aws_signing::config::{self, RequestConfig, SigningConfig};
use aws_signing::env::OsEnv;
use aws_signing::http::{build_request, build_transport, default_transport, send};
use aws_signing::observability::init_logging;
use aws_signing::proxy::{ProxyServer, ReverseProxy};
use aws_signing::signing::{
    default_credentials_provider, default_region, CredentialSummary, SigV4Signer, SigningContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let env = OsEnv;
    let config = config::resolve(&cli, &env)?;

    tracing::debug!(
        endpoint = %config.endpoint,
        signing = config.signing.is_some(),
        reverse_proxy = config.reverse_proxy,
        "Configuration loaded"
    );

    let signing = match &config.signing {
        Some(signing) => Some(signing_context(signing, &config).await?),
        None => None,
    };

    if config.reverse_proxy {
        run_proxy(&config, signing).await
    } else {
        run_request(&config, signing).await
    }
}

async fn signing_context(
    signing: &SigningConfig,
    config: &RequestConfig,
) -> anyhow::Result<SigningContext> {
    let signer = SigV4Signer::new(default_credentials_provider(OsEnv).await);
    let credentials = signer
        .credentials()
        .await
        .context("no AWS credentials found")?;

    if config.dump_credentials {
        tracing::info!(credentials = %CredentialSummary::new(&credentials), "AWS credentials");
    }

    let region = if signing.region.is_empty() {
        default_region().await.unwrap_or_default()
    } else {
        signing.region.clone()
    };

    Ok(SigningContext::new(signer, signing.service.clone(), region))
}

async fn run_request(config: &RequestConfig, signing: Option<SigningContext>) -> anyhow::Result<()> {
    let transport = build_transport(default_transport()?, signing);
    let req = build_request(config)?;

    let mut stdout = tokio::io::stdout();
    let status = send(transport, req, &mut stdout)
        .await
        .context("error executing request")?;
    tracing::debug!(status = %status, "Request complete");
    Ok(())
}

async fn run_proxy(config: &RequestConfig, signing: Option<SigningContext>) -> anyhow::Result<()> {
    let proxy = ReverseProxy::with_signing(config.endpoint.clone(), default_transport()?, signing);
    tracing::info!(
        endpoint = %proxy.target(),
        port = config.port,
        "Starting reverse proxy"
    );

    let listener = ProxyServer::bind(config.port)
        .await
        .with_context(|| format!("error binding port {}", config.port))?;
    ProxyServer::new(proxy).run(listener).await?;
    Ok(())
}
