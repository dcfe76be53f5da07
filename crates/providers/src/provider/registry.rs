use super::error::ProviderError;
use super::providers::{self, anikoto::Anikoto};
use super::site_provider::Provider;
use crate::filter::FilterCapabilities;
use reqwest::Client;

// Constructor shared by every provider: client plus optional JSON config extras.
type ProviderConstructor =
    fn(Client, Option<serde_json::Value>) -> Result<Box<dyn Provider>, ProviderError>;

struct ProviderEntry {
    name: &'static str,
    caps: FilterCapabilities,
    constructor: ProviderConstructor,
}

macro_rules! provider_registry {
    ( $( $name:path => $provider:ty ),+ $(,)? ) => {
        &[
            $(
                ProviderEntry {
                    name: $name,
                    caps: <$provider>::FILTER_CAPS,
                    constructor: |client, extras| {
                        <$provider>::from_extras(client, extras)
                            .map(|p| Box::new(p) as Box<dyn Provider>)
                    },
                },
            )+
        ]
    };
}

// Static provider registry.
static PROVIDERS: &[ProviderEntry] = provider_registry![
    providers::anikoto::NAME => Anikoto,
];

/// Looks up providers by their stable name.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProviderRegistry;

impl ProviderRegistry {
    pub fn new() -> Self {
        Self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        PROVIDERS.iter().map(|p| p.name)
    }

    /// Filter capabilities of a provider without constructing it.
    pub fn capabilities(&self, name: &str) -> Option<FilterCapabilities> {
        self.entry(name).map(|p| p.caps)
    }

    pub fn create(
        &self,
        name: &str,
        client: Client,
        extras: Option<serde_json::Value>,
    ) -> Result<Box<dyn Provider>, ProviderError> {
        let entry = self
            .entry(name)
            .ok_or_else(|| ProviderError::UnknownProvider(name.to_string()))?;
        (entry.constructor)(client, extras)
    }

    fn entry(&self, name: &str) -> Option<&'static ProviderEntry> {
        PROVIDERS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
    }
}
