//! # anime-providers
//!
//! A uniform interface over episodic video sites:
//! `search → episode list → metadata → playable streams`.
//!
//! Each site is a [`Provider`](provider::Provider) implementation that hides
//! the site's markup, AJAX endpoints and obfuscated stream references behind
//! the shared value types in [`media`]. Structured search predicates are
//! described once in [`filter`] and translated per site by a declarative
//! [`FilterSchema`](filter::FilterSchema).
//!
//! ```rust,no_run
//! use anime_providers::filter::Filters;
//! use anime_providers::media::{EpisodeNumber, LanguageType};
//! use anime_providers::provider::{default_client, default_registry};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = default_registry();
//! let provider = registry.create("anikoto", default_client(None)?, None)?;
//!
//! let results = provider.search("frieren", &Filters::default()).await?;
//! let first = &results[0];
//! let streams = provider
//!     .get_video(&first.identifier, EpisodeNumber::Whole(1), LanguageType::Sub)
//!     .await?;
//! for stream in &streams {
//!     println!("{stream}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod filter;
pub mod media;
pub mod provider;

pub use filter::{FilterCapabilities, FilterError, FilterSchema, Filters};
pub use media::{
    EpisodeNumber, ExternalSubtitle, InfoResult, LanguageType, SearchResult, StreamRendition,
};
pub use provider::{Provider, ProviderError, Stage};
