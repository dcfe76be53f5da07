//! Site-agnostic search predicates and their per-provider translation.
//!
//! A [`Filters`] value is built once by the caller and handed to any
//! provider. Each provider declares which predicates it understands through
//! its [`FilterCapabilities`] and how to spell them through a
//! [`FilterSchema`]; predicates outside the declared capabilities are dropped
//! without touching the outbound request.

mod request;
mod schema;

pub use request::FilterRequest;
pub use schema::{FilterError, FilterSchema};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

bitflags! {
    /// Predicates a provider knows how to translate.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FilterCapabilities: u8 {
        const YEAR = 1 << 0;
        const SEASON = 1 << 1;
        const STATUS = 1 << 2;
        const MEDIA_TYPE = 1 << 3;
        /// Searching with an empty query and only structured predicates is meaningful.
        const NO_QUERY = 1 << 4;
        const ALL = Self::YEAR.bits()
            | Self::SEASON.bits()
            | Self::STATUS.bits()
            | Self::MEDIA_TYPE.bits()
            | Self::NO_QUERY.bits();
    }
}

/// Structured predicate names, used for capability checks and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FilterPredicate {
    Year,
    Season,
    Status,
    MediaType,
}

impl FilterPredicate {
    pub fn capability(self) -> FilterCapabilities {
        match self {
            Self::Year => FilterCapabilities::YEAR,
            Self::Season => FilterCapabilities::SEASON,
            Self::Status => FilterCapabilities::STATUS,
            Self::MediaType => FilterCapabilities::MEDIA_TYPE,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Status {
    Upcoming,
    Ongoing,
    Completed,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum MediaType {
    Tv,
    Movie,
    Ova,
    Ona,
    Special,
    Music,
}

/// Structured search predicates. Unset fields are not applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub year: Option<u32>,
    pub season: Option<Season>,
    pub status: Option<Status>,
    pub media_type: Option<MediaType>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_season(mut self, season: Season) -> Self {
        self.season = Some(season);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.season.is_none()
            && self.status.is_none()
            && self.media_type.is_none()
    }

    /// Capabilities a provider needs to honour every set predicate.
    pub fn required_capabilities(&self) -> FilterCapabilities {
        let mut caps = FilterCapabilities::empty();
        caps.set(FilterCapabilities::YEAR, self.year.is_some());
        caps.set(FilterCapabilities::SEASON, self.season.is_some());
        caps.set(FilterCapabilities::STATUS, self.status.is_some());
        caps.set(FilterCapabilities::MEDIA_TYPE, self.media_type.is_some());
        caps
    }
}
