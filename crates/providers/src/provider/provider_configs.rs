//! Provider-specific configuration types and utilities.
//!
//! Providers are constructed from an optional JSON "extras" value. Layers
//! (built-in defaults, config file, command line) are combined with
//! [`merge_provider_extras`] before being deserialized into the typed config.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ProviderError;

/// Anikoto provider configuration. Every field falls back to the provider's
/// built-in value when unset.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AnikotoConfig {
    /// Site base URL (default: "https://anikoto.to")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Embedded player host (default: "https://megaplay.buzz")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_url: Option<String>,
    /// Alternate quality mapper host (default: "https://mapper.kotostream.online")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapper_url: Option<String>,
    /// Extra headers sent to the site's own endpoints
    #[serde(default, skip_serializing_if = "FxHashMap::is_empty")]
    pub headers: FxHashMap<String, String>,
}

impl AnikotoConfig {
    pub fn from_extras(extras: Option<Value>) -> Result<Self, ProviderError> {
        match extras {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value)
                .map_err(|e| ProviderError::InvalidConfig(e.to_string())),
        }
    }
}

/// Merge two JSON objects, with overlay taking precedence.
///
/// This function performs a shallow merge of JSON objects. For nested objects,
/// the overlay completely replaces the base value (no deep merge).
///
/// # Example
/// ```
/// use serde_json::json;
/// use anime_providers::provider::merge_provider_extras;
///
/// let base = Some(json!({"base_url": "https://a.example", "player_url": "https://p.example"}));
/// let overlay = Some(json!({"base_url": "https://b.example"}));
/// let merged = merge_provider_extras(base, overlay);
/// assert_eq!(
///     merged,
///     Some(json!({"base_url": "https://b.example", "player_url": "https://p.example"}))
/// );
/// ```
pub fn merge_provider_extras(base: Option<Value>, overlay: Option<Value>) -> Option<Value> {
    match (base, overlay) {
        (None, None) => None,
        (Some(b), None) => Some(b),
        (None, Some(o)) => Some(o),
        (Some(Value::Object(mut base_map)), Some(Value::Object(overlay_map))) => {
            for (k, v) in overlay_map {
                // Skip null values - they don't override
                if !v.is_null() {
                    base_map.insert(k, v);
                }
            }
            Some(Value::Object(base_map))
        }
        // If either is not an object, overlay wins
        (_, Some(o)) => Some(o),
    }
}
