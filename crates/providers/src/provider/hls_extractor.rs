use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use m3u8_rs::{MasterPlaylist, Playlist};
use reqwest::header::REFERER;
use tracing::debug;
use url::Url;

use super::error::{ProviderError, Stage};
use super::site_provider::SiteClient;
use crate::media::{EpisodeNumber, LanguageType, StreamRendition, SubtitleSet};

/// Everything a manifest pass stamps onto the renditions it produces.
#[derive(Debug, Clone)]
pub struct ManifestContext {
    pub episode: EpisodeNumber,
    pub language: LanguageType,
    pub subtitles: Option<Arc<SubtitleSet>>,
    pub referrer: Option<String>,
    /// Resolution reported when the manifest is a single stream
    pub fallback_resolution: NonZeroU32,
}

impl ManifestContext {
    fn rendition(&self, url: String, resolution: NonZeroU32) -> StreamRendition {
        StreamRendition::new(url, resolution, self.episode, self.language)
            .with_subtitles(self.subtitles.clone())
            .with_referrer(self.referrer.clone())
    }
}

#[async_trait]
pub trait HlsExtractor {
    /// Fetches `m3u8_url` (with the context's referrer) and expands it into
    /// renditions.
    async fn extract_hls_renditions(
        &self,
        client: &SiteClient,
        m3u8_url: &str,
        context: &ManifestContext,
    ) -> Result<Vec<StreamRendition>, ProviderError> {
        let mut request = client.get_plain(m3u8_url);
        if let Some(referrer) = &context.referrer {
            request = request.header(REFERER, referrer);
        }
        let body = client.fetch_text(Stage::Manifest, request).await?;
        renditions_from_manifest(body.as_bytes(), m3u8_url, context)
    }
}

/// Expands a manifest body into renditions.
///
/// A media playlist, or a master playlist without playable variants, is a
/// single stream reported at the context's fallback resolution. Otherwise
/// every non I-frame variant becomes one rendition, in manifest order.
pub fn renditions_from_manifest(
    body: &[u8],
    m3u8_url: &str,
    context: &ManifestContext,
) -> Result<Vec<StreamRendition>, ProviderError> {
    let base_url =
        Url::parse(m3u8_url).map_err(|e| ProviderError::decode(Stage::Manifest, e.to_string()))?;

    let playlist = m3u8_rs::parse_playlist_res(body)
        .map_err(|e| ProviderError::decode(Stage::Manifest, e.to_string()))?;

    let renditions = match playlist {
        Playlist::MasterPlaylist(pl) => {
            let renditions = process_master_playlist(pl, &base_url, context)?;
            if renditions.is_empty() {
                debug!("Master playlist has no variants, treating as single stream");
                vec![context.rendition(m3u8_url.to_string(), context.fallback_resolution)]
            } else {
                renditions
            }
        }
        Playlist::MediaPlaylist(_) => {
            vec![context.rendition(m3u8_url.to_string(), context.fallback_resolution)]
        }
    };

    Ok(renditions)
}

fn process_master_playlist(
    playlist: MasterPlaylist,
    base_url: &Url,
    context: &ManifestContext,
) -> Result<Vec<StreamRendition>, ProviderError> {
    playlist
        .variants
        .into_iter()
        .filter(|variant| !variant.is_i_frame)
        .map(|variant| {
            let stream_url = base_url
                .join(&variant.uri)
                .map_err(|e| ProviderError::decode(Stage::Manifest, e.to_string()))?;
            let height = variant
                .resolution
                .and_then(|r| u32::try_from(r.height).ok())
                .and_then(NonZeroU32::new)
                .ok_or_else(|| {
                    ProviderError::decode(
                        Stage::Manifest,
                        format!("variant {} has no resolution", variant.uri),
                    )
                })?;
            Ok(context.rendition(stream_url.to_string(), height))
        })
        .collect()
}
