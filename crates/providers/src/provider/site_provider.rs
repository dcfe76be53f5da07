use crate::filter::{FilterCapabilities, Filters};
use crate::media::{EpisodeNumber, InfoResult, LanguageType, SearchResult, StreamRendition};
use crate::provider::default::DEFAULT_UA;

use super::error::{ProviderError, Stage};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::str::FromStr;
use tracing::{debug, trace};

/// HTTP access to one site.
///
/// Holds the shared `reqwest` client, the site's base URL and the headers the
/// site expects on its own endpoints. Requests to third-party hosts use
/// [`SiteClient::get_plain`], which only carries the browser defaults.
#[derive(Debug, Clone)]
pub struct SiteClient {
    // base url of the site, e.g., "https://anikoto.to"
    pub base_url: String,
    // name of the provider, e.g., "anikoto"
    pub provider_name: String,
    pub client: Client,
    default_headers: HeaderMap,
    site_headers: HeaderMap,
}

impl SiteClient {
    pub fn new<S1: Into<String>, S2: Into<String>>(
        provider_name: S1,
        base_url: S2,
        client: Client,
    ) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(DEFAULT_UA),
        );
        default_headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        // Do not set `Accept-Encoding` here.
        // Reqwest auto-adds it (and auto-decompresses) when the corresponding
        // crate features are enabled, as long as we don't override the header.

        let base_url: String = base_url.into();
        Self {
            provider_name: provider_name.into(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            client,
            default_headers,
            site_headers: HeaderMap::new(),
        }
    }

    /// Insert a header sent on every request to the site itself.
    /// Invalid names or values are skipped.
    pub fn add_header_str<K: AsRef<str>, V: AsRef<str>>(&mut self, key: K, value: V) {
        match HeaderName::from_str(key.as_ref()) {
            Ok(name) => match HeaderValue::from_str(value.as_ref()) {
                Ok(value) => {
                    self.site_headers.insert(name, value);
                }
                Err(e) => {
                    debug!(error = %e, "Invalid header value; skipping");
                }
            },
            Err(e) => {
                debug!(error = %e, "Invalid header name; skipping");
            }
        }
    }

    pub fn add_header_owned<K: Into<HeaderName>, V: Into<HeaderValue>>(
        &mut self,
        key: K,
        value: V,
    ) {
        self.site_headers.insert(key.into(), value.into());
    }

    pub fn get_site_headers(&self) -> &HeaderMap {
        &self.site_headers
    }

    /// Absolute URL for a path on the site.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET to the site with its configured headers.
    pub fn get(&self, url: &str) -> RequestBuilder {
        let mut headers = self.default_headers.clone();
        headers.extend(self.site_headers.clone());
        self.client.request(Method::GET, url).headers(headers)
    }

    /// GET with browser default headers only, for pages and third-party hosts
    /// that reject the site's AJAX headers.
    pub fn get_plain(&self, url: &str) -> RequestBuilder {
        self.client
            .request(Method::GET, url)
            .headers(self.default_headers.clone())
    }

    /// Sends `request` and returns the body, mapping transport failures and
    /// non-success statuses to errors tagged with `stage`.
    pub async fn fetch_text(
        &self,
        stage: Stage,
        request: RequestBuilder,
    ) -> Result<String, ProviderError> {
        let response = request
            .send()
            .await
            .map_err(|source| ProviderError::Transport { stage, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                stage,
                url: response.url().to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| ProviderError::Transport { stage, source })?;
        trace!(%stage, len = body.len(), "fetched body");
        Ok(body)
    }

    /// Like [`SiteClient::fetch_text`], then decodes the body as JSON.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        stage: Stage,
        request: RequestBuilder,
    ) -> Result<T, ProviderError> {
        let body = self.fetch_text(stage, request).await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::decode(stage, e.to_string()))
    }
}

/// One episodic video site.
///
/// Identifiers returned by [`Provider::search`] address the title in every
/// other call. Transport failures are never retried here.
#[async_trait]
pub trait Provider: Send + Sync {
    fn get_client(&self) -> &SiteClient;

    /// Stable provider name, e.g. "anikoto"
    fn name(&self) -> &'static str;

    fn base_url(&self) -> &str {
        &self.get_client().base_url
    }

    /// Predicates this provider can translate into its search request.
    fn filter_caps(&self) -> FilterCapabilities;

    async fn search(
        &self,
        query: &str,
        filters: &Filters,
    ) -> Result<Vec<SearchResult>, ProviderError>;

    /// Episode numbers available in `lang`, in the order the site lists them.
    async fn get_episodes(
        &self,
        identifier: &str,
        lang: LanguageType,
    ) -> Result<Vec<EpisodeNumber>, ProviderError>;

    async fn get_info(&self, identifier: &str) -> Result<InfoResult, ProviderError>;

    async fn get_video(
        &self,
        identifier: &str,
        episode: EpisodeNumber,
        lang: LanguageType,
    ) -> Result<Vec<StreamRendition>, ProviderError>;
}
