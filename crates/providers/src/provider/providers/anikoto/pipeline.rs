//! Stream resolution for anikoto episodes.
//!
//! Each network hop is one method returning a typed intermediate value, so a
//! failure names the stage that produced it. Stages 1-3 are sequential; after
//! the server reference is known the alternate quality branch and the primary
//! player branch run concurrently.

use std::num::NonZeroU32;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use base64::Engine as _;
use futures::future::try_join_all;
use regex::Regex;
use reqwest::header::REFERER;
use serde_json::Value;
use tracing::{debug, instrument, trace};

use super::models::{HtmlFragmentResponse, PlayerSourcesResponse, QualityTable, ServerResponse};
use super::parse::{self, EpisodeEntry, ServerLookup};
use crate::media::{
    EpisodeNumber, ExternalSubtitle, LanguageType, StreamRendition, SubtitleSet, language_code2,
};
use crate::provider::error::{ProviderError, Stage};
use crate::provider::hls_extractor::{HlsExtractor, ManifestContext};
use crate::provider::site_provider::SiteClient;
use crate::provider::utils::capture_group_1;

static QUALITY_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|-)(\d+)p?\s*$").unwrap());

/// Nominal height reported for a manifest that is a single stream.
const SINGLE_STREAM_RESOLUTION: NonZeroU32 = NonZeroU32::new(1080).unwrap();

const SUBTITLE_CODEC: &str = "vtt";

/// Tokens the alternate quality mapper is keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationTokens {
    pub slug: String,
    pub mal_id: String,
    pub timestamp: String,
}

/// The listing entry chosen for the requested episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEpisode {
    pub episode_id: String,
    pub tokens: CorrelationTokens,
}

/// Manifest location and subtitles returned by the player API.
#[derive(Debug, Clone)]
pub struct PlayerSources {
    pub manifest_url: String,
    pub subtitles: Option<Arc<SubtitleSet>>,
}

pub struct ResolutionPipeline<'a> {
    client: &'a SiteClient,
    player_url: &'a str,
    mapper_url: &'a str,
}

#[async_trait]
impl HlsExtractor for ResolutionPipeline<'_> {}

impl<'a> ResolutionPipeline<'a> {
    pub fn new(client: &'a SiteClient, player_url: &'a str, mapper_url: &'a str) -> Self {
        Self {
            client,
            player_url,
            mapper_url,
        }
    }

    /// Resolves every playable rendition of `episode` in `lang`.
    ///
    /// Alternate quality renditions come first, followed by the primary
    /// manifest's renditions, each group in source order.
    #[instrument(skip(self), fields(provider = %self.client.provider_name))]
    pub async fn run(
        &self,
        identifier: &str,
        episode: EpisodeNumber,
        lang: LanguageType,
    ) -> Result<Vec<StreamRendition>, ProviderError> {
        let entries = self.episode_listing(identifier).await?;
        let resolved = select_episode(&entries, identifier, episode, lang)?;
        debug!(episode_id = %resolved.episode_id, "Selected episode");

        let server_ref = self
            .server_reference(identifier, &resolved.episode_id, lang)
            .await?;

        let (mut renditions, primary) = tokio::try_join!(
            self.alternate_quality(&resolved.tokens, episode, lang),
            self.primary_streams(&server_ref, episode, lang),
        )?;
        debug!(
            alternate = renditions.len(),
            primary = primary.len(),
            "Resolved renditions"
        );
        renditions.extend(primary);
        Ok(renditions)
    }

    /// Stage 1: the raw episode listing of a title.
    pub async fn episode_listing(
        &self,
        identifier: &str,
    ) -> Result<Vec<EpisodeEntry>, ProviderError> {
        let url = self.client.url(&format!("ajax/episode/list/{identifier}"));
        let response: HtmlFragmentResponse = self
            .client
            .fetch_json(Stage::EpisodeList, self.client.get(&url))
            .await?;
        Ok(parse::parse_episode_list(&response.result))
    }

    /// Stage 3: the server reference for `lang`. A listing without a server
    /// group for the language means the language is unavailable.
    pub async fn server_reference(
        &self,
        identifier: &str,
        episode_id: &str,
        lang: LanguageType,
    ) -> Result<String, ProviderError> {
        let url = self.client.url("ajax/server/list");
        let request = self.client.get(&url).query(&[("servers", episode_id)]);
        let response: HtmlFragmentResponse =
            self.client.fetch_json(Stage::ServerList, request).await?;

        match parse::parse_server_list(&response.result, lang) {
            ServerLookup::Found(reference) => Ok(reference),
            ServerLookup::MissingLink => Err(ProviderError::layout(
                Stage::ServerList,
                format!("{lang} server group has no link id"),
            )),
            ServerLookup::NoMatchingType => Err(ProviderError::LanguageUnavailable {
                identifier: identifier.to_string(),
                language: lang,
            }),
        }
    }

    /// Stage 4: exchanges a server reference for the URL it redirects to.
    pub async fn resolve_server_redirect(
        &self,
        reference: &str,
        stage: Stage,
    ) -> Result<String, ProviderError> {
        let url = self.client.url("ajax/server");
        let request = self.client.get(&url).query(&[("get", reference)]);
        let response: ServerResponse = self.client.fetch_json(stage, request).await?;
        trace!(url = %response.result.url, "Server redirect");
        Ok(response.result.url)
    }

    /// Stage 5: the player id embedded in the player page.
    pub async fn player_id(&self, redirect_url: &str) -> Result<String, ProviderError> {
        let request = self
            .client
            .get_plain(redirect_url)
            .header(REFERER, &self.client.base_url);
        let body = self.client.fetch_text(Stage::PlayerPage, request).await?;
        parse::parse_player_id(&body).ok_or_else(|| {
            ProviderError::layout(Stage::PlayerPage, "player page has no data-id")
        })
    }

    /// Stage 6: manifest URL and subtitle tracks from the player API.
    pub async fn player_sources(&self, player_id: &str) -> Result<PlayerSources, ProviderError> {
        let url = format!("{}/stream/getSources", self.player_url);
        let request = self
            .client
            .get_plain(&url)
            .query(&[("id", player_id), ("id", player_id)])
            .header(REFERER, &self.client.base_url);
        let response: PlayerSourcesResponse =
            self.client.fetch_json(Stage::PlayerSources, request).await?;

        let subtitles = subtitle_set(response.tracks);
        Ok(PlayerSources {
            manifest_url: response.sources.file,
            subtitles: (!subtitles.is_empty()).then(|| Arc::new(subtitles)),
        })
    }

    /// Stage 7: renditions published by the alternate quality mapper.
    ///
    /// Tiers without an entry for `lang` are skipped. Every remaining tier
    /// is resolved concurrently; the table order is kept.
    #[instrument(skip(self, tokens), fields(mal_id = %tokens.mal_id))]
    pub async fn alternate_quality(
        &self,
        tokens: &CorrelationTokens,
        episode: EpisodeNumber,
        lang: LanguageType,
    ) -> Result<Vec<StreamRendition>, ProviderError> {
        let url = format!(
            "{}/api/mal/{}/{}/{}",
            self.mapper_url, tokens.mal_id, tokens.slug, tokens.timestamp
        );
        let table: QualityTable = self
            .client
            .fetch_json(Stage::AlternateQuality, self.client.get_plain(&url))
            .await?;

        let tiers = quality_tiers(&table, lang)?;
        debug!(tiers = tiers.len(), "Alternate quality tiers");

        let lookups = tiers.into_iter().map(|(resolution, reference)| async move {
            let redirect = self
                .resolve_server_redirect(&reference, Stage::AlternateQuality)
                .await?;
            let stream_url = decode_fragment_url(&redirect)?;
            Ok::<_, ProviderError>(StreamRendition::new(stream_url, resolution, episode, lang))
        });

        try_join_all(lookups).await
    }

    /// Stages 4-6 and 8: redirect, player page, player API, manifest.
    #[instrument(skip(self))]
    pub async fn primary_streams(
        &self,
        server_ref: &str,
        episode: EpisodeNumber,
        lang: LanguageType,
    ) -> Result<Vec<StreamRendition>, ProviderError> {
        let redirect = self
            .resolve_server_redirect(server_ref, Stage::ServerRedirect)
            .await?;
        let player_id = self.player_id(&redirect).await?;
        let sources = self.player_sources(&player_id).await?;

        let context = ManifestContext {
            episode,
            language: lang,
            subtitles: sources.subtitles,
            referrer: Some(format!("{}/", self.player_url)),
            fallback_resolution: SINGLE_STREAM_RESOLUTION,
        };
        self.extract_hls_renditions(self.client, &sources.manifest_url, &context)
            .await
    }
}

/// Stage 2: picks the listing entry for `episode` among the entries
/// available in `lang` and captures its correlation tokens.
///
/// Entries are matched by their own episode number. Only when the listing
/// carries no numbers at all is the episode treated as a 1-based position.
pub fn select_episode(
    entries: &[EpisodeEntry],
    identifier: &str,
    episode: EpisodeNumber,
    lang: LanguageType,
) -> Result<ResolvedEpisode, ProviderError> {
    let available: Vec<&EpisodeEntry> = entries.iter().filter(|e| e.is_available(lang)).collect();

    let entry = if available.iter().all(|e| e.raw_number.is_none()) {
        episode
            .as_position()
            .and_then(|pos| available.get(pos - 1).copied())
    } else {
        find_numbered(available.iter().copied(), episode)?
    };

    let Some(entry) = entry else {
        if find_numbered(entries.iter(), episode)?.is_some() {
            return Err(ProviderError::LanguageUnavailable {
                identifier: identifier.to_string(),
                language: lang,
            });
        }
        return Err(ProviderError::layout(
            Stage::EpisodeList,
            format!("episode {episode} not in {lang} listing of {identifier}"),
        ));
    };

    let field = |value: &Option<String>, name: &str| {
        value.clone().ok_or_else(|| {
            ProviderError::layout(
                Stage::EpisodeList,
                format!("episode {episode} entry has no {name}"),
            )
        })
    };

    Ok(ResolvedEpisode {
        episode_id: field(&entry.episode_id, "data-ids")?,
        tokens: CorrelationTokens {
            slug: field(&entry.slug, "data-slug")?,
            mal_id: field(&entry.mal_id, "data-mal")?,
            timestamp: field(&entry.timestamp, "data-timestamp")?,
        },
    })
}

fn find_numbered<'e>(
    entries: impl Iterator<Item = &'e EpisodeEntry>,
    episode: EpisodeNumber,
) -> Result<Option<&'e EpisodeEntry>, ProviderError> {
    for entry in entries {
        if entry.number()? == Some(episode) {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

fn subtitle_set(tracks: Vec<super::models::PlayerTrack>) -> SubtitleSet {
    let mut subtitles = SubtitleSet::default();
    for track in tracks {
        if track.kind.as_deref() == Some("thumbnails") {
            continue;
        }
        let (Some(label), Some(file)) = (track.label, track.file) else {
            trace!("Skipping track without label or file");
            continue;
        };
        let lang = label.split('-').next().unwrap_or_default().trim().to_string();
        let subtitle = ExternalSubtitle {
            url: file,
            shortcode: language_code2(&lang).to_string(),
            codec: SUBTITLE_CODEC.to_string(),
            lang,
        };
        subtitles.insert(label, subtitle);
    }
    subtitles
}

/// Tiers of the quality table carrying a non-empty reference for `lang`, as
/// `(resolution, server reference)` in table order.
fn quality_tiers(
    table: &QualityTable,
    lang: LanguageType,
) -> Result<Vec<(NonZeroU32, String)>, ProviderError> {
    let mut tiers = Vec::new();
    for (key, entry) in table {
        let Some(reference) = entry
            .get(lang.as_ref())
            .and_then(|e| e.get("url"))
            .and_then(Value::as_str)
            .filter(|r| !r.trim().is_empty())
        else {
            trace!(tier = %key, "No entry for language");
            continue;
        };

        let resolution = capture_group_1(&QUALITY_KEY_REGEX, key)
            .and_then(|digits| digits.parse::<u32>().ok())
            .and_then(NonZeroU32::new)
            .ok_or_else(|| {
                ProviderError::decode(
                    Stage::AlternateQuality,
                    format!("quality key {key:?} has no resolution"),
                )
            })?;
        tiers.push((resolution, reference.to_string()));
    }
    Ok(tiers)
}

/// The playable URL is base64 encoded after the `#` of the redirect URL.
fn decode_fragment_url(redirect: &str) -> Result<String, ProviderError> {
    let encoded = redirect.split('#').nth(1).ok_or_else(|| {
        ProviderError::decode(
            Stage::AlternateQuality,
            format!("redirect {redirect} has no fragment"),
        )
    })?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ProviderError::decode(Stage::AlternateQuality, e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ProviderError::decode(Stage::AlternateQuality, e.to_string()))
}
