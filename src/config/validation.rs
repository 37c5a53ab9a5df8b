//! Configuration validation.
//!
//! Semantic checks on a resolved [`RequestConfig`]. All errors are collected
//! rather than stopping at the first one.

use thiserror::Error;

use crate::config::schema::RequestConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("endpoint {0:?} must use http or https")]
    EndpointScheme(String),

    #[error("endpoint {0:?} must include a host")]
    EndpointHost(String),

    #[error("aws service must not be empty when signing is enabled")]
    EmptyService,

    #[error("reverse proxy port must not be 0")]
    ZeroPort,
}

/// Validate a resolved configuration.
pub fn validate_config(config: &RequestConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let endpoint = config.endpoint.to_string();
    match config.endpoint.scheme_str() {
        Some("http") | Some("https") => {}
        _ => errors.push(ValidationError::EndpointScheme(endpoint.clone())),
    }
    if config.endpoint.host().map_or(true, str::is_empty) {
        errors.push(ValidationError::EndpointHost(endpoint));
    }

    if config
        .signing
        .as_ref()
        .is_some_and(|s| s.service.is_empty())
    {
        errors.push(ValidationError::EmptyService);
    }

    if config.reverse_proxy && config.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
