use super::error::ProviderError;
use super::registry::ProviderRegistry;
use reqwest::Client;
use rustls::{ClientConfig, crypto::ring};
use rustls_platform_verifier::BuilderVerifierExt;
use std::sync::Arc;
use std::time::Duration;

pub(crate) const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the shared HTTP client: rustls with the platform verifier and a
/// per-request timeout (30s unless overridden). A timeout on any hop fails the
/// whole provider call.
pub fn default_client(timeout: Option<Duration>) -> Result<Client, ProviderError> {
    let provider = Arc::new(ring::default_provider());
    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ProviderError::Client(e.to_string()))?
        .with_platform_verifier()
        .map_err(|e| ProviderError::Client(e.to_string()))?
        .with_no_client_auth();

    Client::builder()
        .use_preconfigured_tls(tls_config)
        .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
        .build()
        .map_err(|e| ProviderError::Client(e.to_string()))
}

/// Returns a registry populated with all the supported providers.
pub fn default_registry() -> ProviderRegistry {
    ProviderRegistry::new()
}
