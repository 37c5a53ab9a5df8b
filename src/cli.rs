//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::AwsSettings;

/// Send a single SigV4-signed request, or run a signing reverse proxy.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "aws-signing", version, about)]
pub struct Cli {
    /// Request body; `@-` reads standard input.
    #[arg(short = 'd', long = "data")]
    pub data: Option<String>,

    /// Sign requests with AWS SigV4.
    #[arg(short = 'a', long = "aws")]
    pub aws: bool,

    /// Endpoint url.
    #[arg(short = 'e', long = "endpoint")]
    pub endpoint: Option<String>,

    /// AWS service name.
    #[arg(short = 's', long = "service")]
    pub service: Option<String>,

    /// AWS region.
    #[arg(long = "region")]
    pub region: Option<String>,

    /// Extra request header as `Name: value`, repeatable.
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// HTTP method.
    #[arg(short = 'X', long = "request")]
    pub method: Option<String>,

    /// Run a reverse proxy instead of a single request.
    #[arg(short = 'r', long = "reverse-proxy")]
    pub reverse_proxy: bool,

    /// Reverse proxy listen port.
    #[arg(short = 'p', long = "reverse-proxy-port")]
    pub reverse_proxy_port: Option<u16>,

    /// Directory of `*.toml` config files.
    #[arg(long = "config-dir")]
    pub config_dir: Option<PathBuf>,

    /// Log the resolved AWS credentials, secrets redacted.
    #[arg(long = "creds")]
    pub creds: bool,

    /// Verbose logging.
    #[arg(long = "debug")]
    pub debug: bool,

    /// Request path, joined onto the endpoint.
    pub path: Option<String>,
}

impl Cli {
    /// The AWS settings given on the command line.
    pub fn aws_settings(&self) -> AwsSettings {
        AwsSettings {
            enabled: self.aws,
            endpoint: self.endpoint.clone(),
            service: self.service.clone(),
            region: self.region.clone(),
        }
    }
}
