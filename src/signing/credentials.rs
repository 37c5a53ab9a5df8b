//! Credential and region resolution.
//!
//! Credentials come from a provider chain: the injected [`Env`] first, then
//! the AWS default chain (environment, shared config and credentials files,
//! SSO, web identity, container and instance roles).

use std::sync::Arc;

use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_config::default_provider::region::DefaultRegionChain;
use aws_config::meta::credentials::CredentialsProviderChain;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{future, ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;

use crate::env::{Env, AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN};

/// Name reported for credentials read from [`Env`].
const ENV_PROVIDER: &str = "environment";

/// Load static credentials from `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`
/// and the optional `AWS_SESSION_TOKEN`.
pub fn load_env_credentials(env: &dyn Env) -> Option<Credentials> {
    let access_key_id = env.non_empty(AWS_ACCESS_KEY_ID)?;
    let secret_access_key = env.non_empty(AWS_SECRET_ACCESS_KEY)?;

    Some(Credentials::new(
        access_key_id,
        secret_access_key,
        env.non_empty(AWS_SESSION_TOKEN),
        None,
        ENV_PROVIDER,
    ))
}

/// Credentials provider over an [`Env`].
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    env: Arc<dyn Env>,
}

impl EnvCredentials {
    pub fn new(env: impl Env) -> Self {
        Self { env: Arc::new(env) }
    }
}

impl ProvideCredentials for EnvCredentials {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::ready(
            load_env_credentials(self.env.as_ref())
                .ok_or_else(|| CredentialsError::not_loaded("AWS_ACCESS_KEY_ID or AWS_SECRET_ACCESS_KEY not set")),
        )
    }
}

/// `env` first, then the AWS default credentials chain.
pub async fn default_credentials_provider(env: impl Env) -> SharedCredentialsProvider {
    let chain = CredentialsProviderChain::first_try(ENV_PROVIDER, EnvCredentials::new(env))
        .or_else("default", DefaultCredentialsChain::builder().build().await);
    SharedCredentialsProvider::new(chain)
}

/// Region from `AWS_REGION`/`AWS_DEFAULT_REGION`, the shared config profile,
/// or instance metadata.
pub async fn default_region() -> Option<String> {
    DefaultRegionChain::builder()
        .build()
        .region()
        .await
        .map(|region| region.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::StaticEnv;

    #[test]
    fn test_load_env_credentials() {
        let env = StaticEnv::from_pairs([
            (AWS_ACCESS_KEY_ID, "ak"),
            (AWS_SECRET_ACCESS_KEY, "sk"),
            (AWS_SESSION_TOKEN, "token"),
        ]);
        let creds = load_env_credentials(&env).unwrap();
        assert_eq!(creds.access_key_id(), "ak");
        assert_eq!(creds.secret_access_key(), "sk");
        assert_eq!(creds.session_token(), Some("token"));

        let env = StaticEnv::from_pairs([(AWS_ACCESS_KEY_ID, "ak")]);
        assert!(load_env_credentials(&env).is_none());
    }

    #[tokio::test]
    async fn test_env_provider_not_loaded() {
        let provider = EnvCredentials::new(StaticEnv::default());
        let err = provider.provide_credentials().await.unwrap_err();
        assert!(matches!(err, CredentialsError::CredentialsNotLoaded(_)));
    }

    #[tokio::test]
    async fn test_chain_falls_through_env() {
        let fallback = Credentials::new("AKIDFALLBACK", "secret", None, None, "profile");
        let chain = CredentialsProviderChain::first_try(ENV_PROVIDER, EnvCredentials::new(StaticEnv::default()))
            .or_else("profile", fallback);

        let creds = chain.provide_credentials().await.unwrap();
        assert_eq!(creds.access_key_id(), "AKIDFALLBACK");

        let env = StaticEnv::from_pairs([
            (AWS_ACCESS_KEY_ID, "AKIDENV"),
            (AWS_SECRET_ACCESS_KEY, "sk"),
        ]);
        let chain = CredentialsProviderChain::first_try(ENV_PROVIDER, EnvCredentials::new(env))
            .or_else("profile", Credentials::new("AKIDFALLBACK", "secret", None, None, "profile"));
        assert_eq!(chain.provide_credentials().await.unwrap().access_key_id(), "AKIDENV");
    }
}
