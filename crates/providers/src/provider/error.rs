use reqwest::StatusCode;
use strum::Display;
use thiserror::Error;

use crate::filter::FilterError;
use crate::media::LanguageType;

/// Network hop or scrape step an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Stage {
    Search,
    EpisodeList,
    Info,
    ServerList,
    ServerRedirect,
    PlayerPage,
    PlayerSources,
    AlternateQuality,
    Manifest,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{stage}: request failed: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },
    #[error("{stage}: {url} returned {status}")]
    Status {
        stage: Stage,
        url: String,
        status: StatusCode,
    },
    #[error("{stage}: site layout changed: {detail}")]
    LayoutMismatch { stage: Stage, detail: String },
    #[error("{language} is not available for {identifier}")]
    LanguageUnavailable {
        identifier: String,
        language: LanguageType,
    },
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),
    #[error("{stage}: malformed data: {detail}")]
    Decode { stage: Stage, detail: String },
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("invalid provider config: {0}")]
    InvalidConfig(String),
    #[error("failed to build http client: {0}")]
    Client(String),
}

impl ProviderError {
    pub fn layout(stage: Stage, detail: impl Into<String>) -> Self {
        Self::LayoutMismatch {
            stage,
            detail: detail.into(),
        }
    }

    pub fn decode(stage: Stage, detail: impl Into<String>) -> Self {
        Self::Decode {
            stage,
            detail: detail.into(),
        }
    }

    /// The site could not be reached or answered with a non-success status.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. })
    }

    /// The site answered but its markup no longer matches what the provider
    /// expects.
    pub fn is_layout_mismatch(&self) -> bool {
        matches!(self, Self::LayoutMismatch { .. })
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Transport { stage, .. }
            | Self::Status { stage, .. }
            | Self::LayoutMismatch { stage, .. }
            | Self::Decode { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
