//! Configuration loading from disk and resolution of all layers.

use std::fs;
use std::path::{Path, PathBuf};

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use thiserror::Error;
use url::Url;

use crate::cli::Cli;
use crate::config::schema::{
    AwsSettings, FileConfig, RequestBody, RequestConfig, SigningConfig, DEFAULT_PORT,
};
use crate::config::validation::{validate_config, ValidationError};
use crate::env::Env;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("error parsing endpoint url {url:?}: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("error creating request url {0:?}")]
    InvalidRequestUrl(String),

    #[error("invalid header {0:?}")]
    InvalidHeader(String),

    #[error("invalid request method {0:?}")]
    InvalidMethod(String),

    #[error("a request path is required unless running the reverse proxy")]
    MissingPath,

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a single TOML configuration file.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every `*.toml` file in `dir`, in name order, later files winning.
pub fn load_config_dir(dir: &Path) -> Result<FileConfig, ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    paths.retain(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "toml"));
    paths.sort();

    let mut merged = FileConfig::default();
    for path in paths {
        tracing::debug!(path = ?path, "Loading config file");
        merged = merged.merge(load_config(&path)?);
    }
    Ok(merged)
}

/// Resolve defaults, environment, arguments and config files into a
/// [`RequestConfig`], in increasing order of precedence.
pub fn resolve(cli: &Cli, env: &dyn Env) -> Result<RequestConfig, ConfigError> {
    let mut file = FileConfig {
        port: Some(DEFAULT_PORT),
        aws: AwsSettings::defaults().merge(AwsSettings::from_env(env)),
    }
    .merge(FileConfig {
        port: cli.reverse_proxy_port,
        aws: cli.aws_settings(),
    });

    if let Some(dir) = &cli.config_dir {
        file = file.merge(load_config_dir(dir)?);
    }

    let endpoint_str = file.aws.endpoint.clone().unwrap_or_default();
    let endpoint = parse_endpoint(&endpoint_str)?;

    let request_url = match cli.path.as_deref() {
        Some(path) => Some(join_request_url(&endpoint, path)?),
        None if cli.reverse_proxy => None,
        None => return Err(ConfigError::MissingPath),
    };

    let method = match cli.method.as_deref() {
        None | Some("") => Method::GET,
        Some(m) => Method::from_bytes(m.as_bytes())
            .map_err(|_| ConfigError::InvalidMethod(m.to_string()))?,
    };

    let signing = file.aws.enabled.then(|| SigningConfig {
        service: file.aws.service.clone().unwrap_or_default(),
        region: file.aws.region.clone().unwrap_or_default(),
    });

    let config = RequestConfig {
        method,
        body: RequestBody::from_data(cli.data.as_deref()),
        headers: parse_headers(&cli.headers)?,
        request_url,
        endpoint: endpoint
            .as_str()
            .parse()
            .map_err(|_| ConfigError::InvalidRequestUrl(endpoint.to_string()))?,
        signing,
        reverse_proxy: cli.reverse_proxy,
        port: file.port.unwrap_or(DEFAULT_PORT),
        dump_credentials: cli.creds,
        debug: cli.debug,
    };

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    Url::parse(endpoint).map_err(|source| ConfigError::InvalidEndpoint {
        url: endpoint.to_string(),
        source,
    })
}

/// Endpoint without its trailing slash, then `/`, then `path` without a
/// leading `//` or `/`.
fn join_request_url(endpoint: &Url, path: &str) -> Result<Uri, ConfigError> {
    let path = path.strip_prefix("//").unwrap_or(path);
    let path = path.strip_prefix('/').unwrap_or(path);
    let joined = format!("{}/{}", endpoint.as_str().trim_end_matches('/'), path);
    joined
        .parse()
        .map_err(|_| ConfigError::InvalidRequestUrl(joined))
}

/// Parse `Name: value` headers; `Content-Type` defaults to JSON.
pub fn parse_headers(raw: &[String]) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    for header in raw {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| ConfigError::InvalidHeader(header.clone()))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(header.clone()))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| ConfigError::InvalidHeader(header.clone()))?;
        headers.append(name, value);
    }

    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    Ok(headers)
}
