use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderName, HeaderValue};
use tracing::{debug, instrument, trace};

use super::NAME;
use super::filter::{ANIKOTO_FILTER, FILTER_CAPS};
use super::parse;
use super::pipeline::ResolutionPipeline;
use crate::filter::{FilterCapabilities, FilterRequest, Filters};
use crate::media::{EpisodeNumber, InfoResult, LanguageType, SearchResult, StreamRendition};
use crate::provider::error::{ProviderError, Stage};
use crate::provider::provider_configs::AnikotoConfig;
use crate::provider::site_provider::{Provider, SiteClient};

pub struct Anikoto {
    client: SiteClient,
    player_url: String,
    mapper_url: String,
}

impl Anikoto {
    pub const BASE_URL: &str = "https://anikoto.to";
    pub const PLAYER_URL: &str = "https://megaplay.buzz";
    pub const MAPPER_URL: &str = "https://mapper.kotostream.online";
    pub const FILTER_CAPS: FilterCapabilities = FILTER_CAPS;

    /// Upper bound on `/filter` pages fetched per search.
    const MAX_SEARCH_PAGES: u32 = 10;

    pub fn new(client: Client, config: AnikotoConfig) -> Self {
        let base_url = config.base_url.as_deref().unwrap_or(Self::BASE_URL);
        let mut site = SiteClient::new(NAME, base_url, client);
        site.add_header_owned(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        for (key, value) in &config.headers {
            site.add_header_str(key, value);
        }

        let trim = |url: Option<String>, default: &str| {
            url.as_deref()
                .unwrap_or(default)
                .trim_end_matches('/')
                .to_string()
        };

        Self {
            client: site,
            player_url: trim(config.player_url, Self::PLAYER_URL),
            mapper_url: trim(config.mapper_url, Self::MAPPER_URL),
        }
    }

    pub fn from_extras(
        client: Client,
        extras: Option<serde_json::Value>,
    ) -> Result<Self, ProviderError> {
        Ok(Self::new(client, AnikotoConfig::from_extras(extras)?))
    }

    pub fn player_url(&self) -> &str {
        &self.player_url
    }

    pub fn mapper_url(&self) -> &str {
        &self.mapper_url
    }

    fn pipeline(&self) -> ResolutionPipeline<'_> {
        ResolutionPipeline::new(&self.client, &self.player_url, &self.mapper_url)
    }
}

#[async_trait]
impl Provider for Anikoto {
    fn get_client(&self) -> &SiteClient {
        &self.client
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn filter_caps(&self) -> FilterCapabilities {
        FILTER_CAPS
    }

    #[instrument(skip(self, filters), fields(provider = NAME))]
    async fn search(
        &self,
        query: &str,
        filters: &Filters,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        let mut request = FilterRequest::new(self.client.url("filter"));
        ANIKOTO_FILTER.apply(&mut request, query, filters)?;

        let mut results = Vec::new();
        for page in 1..=Self::MAX_SEARCH_PAGES {
            request.set_one("page", page.to_string());
            if let Ok(url) = request.to_url() {
                trace!(%url, "Search request");
            }
            let body = self
                .client
                .fetch_text(
                    Stage::Search,
                    self.client.get(request.url()).query(request.params()),
                )
                .await?;

            let parsed = parse::parse_search_page(&body);
            debug!(page, items = parsed.items.len(), "Fetched search page");
            results.extend(parsed.items);

            if !parsed.has_next {
                break;
            }
        }

        Ok(results)
    }

    #[instrument(skip(self), fields(provider = NAME))]
    async fn get_episodes(
        &self,
        identifier: &str,
        lang: LanguageType,
    ) -> Result<Vec<EpisodeNumber>, ProviderError> {
        let entries = self.pipeline().episode_listing(identifier).await?;

        let mut episodes = Vec::new();
        for entry in entries.iter().filter(|e| e.is_available(lang)) {
            match entry.number()? {
                Some(number) => episodes.push(number),
                None => debug!(?entry, "Skipping episode without number"),
            }
        }
        Ok(episodes)
    }

    #[instrument(skip(self), fields(provider = NAME))]
    async fn get_info(&self, identifier: &str) -> Result<InfoResult, ProviderError> {
        let url = self.client.url(&format!("watch/{identifier}"));
        let body = self
            .client
            .fetch_text(Stage::Info, self.client.get_plain(&url))
            .await?;
        Ok(parse::parse_info(&body))
    }

    async fn get_video(
        &self,
        identifier: &str,
        episode: EpisodeNumber,
        lang: LanguageType,
    ) -> Result<Vec<StreamRendition>, ProviderError> {
        self.pipeline().run(identifier, episode, lang).await
    }
}
