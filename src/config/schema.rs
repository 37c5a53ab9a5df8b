//! Configuration schema definitions.
//!
//! [`FileConfig`] and [`AwsSettings`] are partial layers: every field may be
//! unset and layers are merged in precedence order. [`RequestConfig`] is the
//! fully resolved, immutable result consumed by the request and proxy paths.

use http::{HeaderMap, Method, Uri};
use serde::Deserialize;

use crate::env::{Env, AWS_ENDPOINT, AWS_REGION, AWS_SERVICE, AWS_SIGNING};

/// Endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9200";

/// AWS service used when nothing else is configured.
pub const DEFAULT_SERVICE: &str = "es";

/// Reverse proxy listen port used when nothing else is configured.
pub const DEFAULT_PORT: u16 = 9200;

/// One layer of AWS settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AwsSettings {
    /// Sign outbound requests.
    pub enabled: bool,

    /// Endpoint url (e.g., "https://search-domain.us-east-1.es.amazonaws.com").
    pub endpoint: Option<String>,

    /// AWS service name used in the signature scope.
    pub service: Option<String>,

    /// AWS region used in the signature scope.
    pub region: Option<String>,
}

impl AwsSettings {
    /// Built-in defaults.
    pub fn defaults() -> Self {
        Self {
            enabled: false,
            endpoint: Some(DEFAULT_ENDPOINT.to_string()),
            service: Some(DEFAULT_SERVICE.to_string()),
            region: None,
        }
    }

    /// Settings taken from `AWS_SIGNING`, `AWS_ENDPOINT`, `AWS_SERVICE` and
    /// `AWS_REGION`.
    ///
    /// `AWS_SIGNING` enables signing by being present; its value is ignored.
    pub fn from_env(env: &dyn Env) -> Self {
        Self {
            enabled: env.contains(AWS_SIGNING),
            endpoint: env.non_empty(AWS_ENDPOINT),
            service: env.non_empty(AWS_SERVICE),
            region: env.non_empty(AWS_REGION),
        }
    }

    /// Overlay `other` on top of `self`.
    ///
    /// `enabled` is sticky once any layer sets it; other fields are replaced
    /// only when `other` sets a non-empty value.
    pub fn merge(self, other: AwsSettings) -> Self {
        Self {
            enabled: self.enabled || other.enabled,
            endpoint: pick(self.endpoint, other.endpoint),
            service: pick(self.service, other.service),
            region: pick(self.region, other.region),
        }
    }
}

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Reverse proxy listen port.
    pub port: Option<u16>,

    /// AWS settings.
    pub aws: AwsSettings,
}

impl FileConfig {
    /// Overlay `other` on top of `self`.
    pub fn merge(self, other: FileConfig) -> Self {
        Self {
            port: other.port.filter(|p| *p > 0).or(self.port),
            aws: self.aws.merge(other.aws),
        }
    }
}

fn pick(current: Option<String>, next: Option<String>) -> Option<String> {
    match next {
        Some(value) if !value.is_empty() => Some(value),
        _ => current,
    }
}

/// Where the request body comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// No payload.
    Empty,
    /// A literal payload.
    Literal(String),
    /// Stream standard input.
    Stdin,
}

impl RequestBody {
    /// Interpret a `--data` value; `@-` means standard input.
    pub fn from_data(data: Option<&str>) -> Self {
        match data {
            None | Some("") => RequestBody::Empty,
            Some("@-") => RequestBody::Stdin,
            Some(literal) => RequestBody::Literal(literal.to_string()),
        }
    }
}

/// Signing parameters once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningConfig {
    /// AWS service name.
    pub service: String,

    /// AWS region; empty means resolve from `AWS_REGION` at request time.
    pub region: String,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// HTTP method for the direct request.
    pub method: Method,

    /// Payload for the direct request.
    pub body: RequestBody,

    /// Headers for the direct request.
    pub headers: HeaderMap,

    /// Endpoint joined with the requested path.
    pub request_url: Option<Uri>,

    /// Upstream endpoint.
    pub endpoint: Uri,

    /// `None` when signing is disabled.
    pub signing: Option<SigningConfig>,

    /// Run the reverse proxy instead of a single request.
    pub reverse_proxy: bool,

    /// Reverse proxy listen port.
    pub port: u16,

    /// Log the resolved credentials.
    pub dump_credentials: bool,

    /// Verbose logging.
    pub debug: bool,
}
