pub mod error;
pub mod hls_extractor;
pub mod provider_configs;
pub mod providers;
pub mod registry;
pub mod site_provider;
pub mod utils;
mod default;

pub use default::{DEFAULT_TIMEOUT, default_client, default_registry};
pub use error::{ProviderError, Stage};
pub use provider_configs::{AnikotoConfig, merge_provider_extras};
pub use registry::ProviderRegistry;
pub use site_provider::{Provider, SiteClient};
