//! Client construction for OpenAI-compatible APIs.

use crate::error::{DuprError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Read an API key from the named environment variable.
///
/// An unset or blank variable is a [`DuprError::MissingCredential`].
pub fn api_key_from_env(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(DuprError::MissingCredential(var.to_string())),
    }
}

/// Create a client for an OpenAI-compatible endpoint.
///
/// `api_base` of `None` keeps the OpenAI default.
pub fn create_client(api_key: &str, api_base: Option<&str>) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(api_key, api_base, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create a client with a custom timeout.
pub fn create_client_with_timeout(
    api_key: &str,
    api_base: Option<&str>,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
