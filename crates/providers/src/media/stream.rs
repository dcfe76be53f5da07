use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{EpisodeNumber, LanguageType};

/// A subtitle track delivered next to the video stream.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExternalSubtitle {
    pub url: String,
    /// ISO-639-1 code, or `"und"` when the language name is unknown
    pub shortcode: String,
    /// Container/codec tag, e.g. "vtt"
    pub codec: String,
    /// Display language name
    pub lang: String,
}

/// Subtitle tracks keyed by their display label. Labels are unique within one
/// resolution pass; inserting a label twice keeps the last track.
pub type SubtitleSet = FxHashMap<String, ExternalSubtitle>;

/// One playable encoding of an episode.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StreamRendition {
    pub url: String,
    /// Vertical pixel count
    pub resolution: NonZeroU32,
    pub episode: EpisodeNumber,
    pub language: LanguageType,
    /// Shared by every rendition of the same manifest pass
    pub subtitles: Option<Arc<SubtitleSet>>,
    /// `Referer` header to send when fetching `url`
    pub referrer: Option<String>,
}

impl StreamRendition {
    pub fn new(
        url: impl Into<String>,
        resolution: NonZeroU32,
        episode: EpisodeNumber,
        language: LanguageType,
    ) -> Self {
        Self {
            url: url.into(),
            resolution,
            episode,
            language,
            subtitles: None,
            referrer: None,
        }
    }

    pub fn with_subtitles(mut self, subtitles: Option<Arc<SubtitleSet>>) -> Self {
        self.subtitles = subtitles;
        self
    }

    pub fn with_referrer(mut self, referrer: Option<String>) -> Self {
        self.referrer = referrer;
        self
    }

    pub fn subtitle_count(&self) -> usize {
        self.subtitles.as_ref().map_or(0, |s| s.len())
    }
}

impl fmt::Display for StreamRendition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ep {} [{}] {}p - {}",
            self.episode, self.language, self.resolution, self.url
        )?;
        if let Some(referrer) = &self.referrer {
            write!(f, " (referer: {referrer})")?;
        }
        Ok(())
    }
}

/// Which rendition a caller wants out of a `get_video` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityPreference {
    #[default]
    Best,
    Worst,
    Exact(u32),
}

impl FromStr for QualityPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "best" => Ok(Self::Best),
            "worst" => Ok(Self::Worst),
            other => other
                .trim_end_matches('p')
                .parse::<u32>()
                .map(Self::Exact)
                .map_err(|_| format!("invalid quality: {s}")),
        }
    }
}

/// Picks one rendition according to `preference`. Ties keep the earliest
/// rendition, so providers' source ordering still matters.
pub fn select_rendition(
    renditions: &[StreamRendition],
    preference: QualityPreference,
) -> Option<&StreamRendition> {
    match preference {
        QualityPreference::Best => renditions
            .iter()
            .rev()
            .max_by_key(|r| r.resolution),
        QualityPreference::Worst => renditions.iter().min_by_key(|r| r.resolution),
        QualityPreference::Exact(height) => {
            renditions.iter().find(|r| r.resolution.get() == height)
        }
    }
}
