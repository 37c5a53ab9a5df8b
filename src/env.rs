//! Environment access.
//!
//! Components never read process variables directly; they receive an [`Env`]
//! at construction so tests can substitute a [`StaticEnv`].

use std::collections::HashMap;
use std::fmt::Debug;

/// Enables signing when present, regardless of value.
pub const AWS_SIGNING: &str = "AWS_SIGNING";
/// Overrides the endpoint url.
pub const AWS_ENDPOINT: &str = "AWS_ENDPOINT";
/// Overrides the AWS service name.
pub const AWS_SERVICE: &str = "AWS_SERVICE";
/// Overrides the AWS region.
pub const AWS_REGION: &str = "AWS_REGION";
/// Access key id for the default signer.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
/// Secret access key for the default signer.
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
/// Optional session token for the default signer.
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// Read-only view of environment variables.
pub trait Env: Debug + Send + Sync + 'static {
    /// Get an environment variable.
    ///
    /// - Returns `Some(v)` if the variable is set and is valid utf-8.
    /// - Returns `None` if the variable is not set or the value is invalid.
    fn var(&self, key: &str) -> Option<String>;

    /// Whether the variable is set at all, even to an empty value.
    fn contains(&self, key: &str) -> bool {
        self.var(key).is_some()
    }

    /// Get a variable, treating an empty value as unset.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.is_empty())
    }
}

/// The environment of the current process.
#[derive(Debug, Copy, Clone, Default)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }
}

/// A fixed set of variables.
///
/// This is useful for testing or for providing a fixed environment.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    /// The environment variables to use.
    pub envs: HashMap<String, String>,
}

impl StaticEnv {
    /// Build from `(key, value)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            envs: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }
}
