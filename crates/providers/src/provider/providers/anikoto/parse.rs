//! Synchronous markup extraction for anikoto pages and AJAX fragments.
//!
//! `scraper` documents are not `Send`, so every function here parses and
//! returns owned data before the caller awaits the next hop.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::filter::Status;
use crate::media::{EpisodeNumber, InfoResult, LanguageType, SearchResult};
use crate::provider::error::{ProviderError, Stage};
use crate::provider::utils::{leading_text, safe_attr, safe_text, select_first};

macro_rules! selector {
    ($name:ident, $css:expr) => {
        static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

selector!(ITEM, "div.item");
selector!(POSTER_TIP, "div.ani.poster.tip");
selector!(DIV, "div");
selector!(IMG, "img");
selector!(ANCHOR, "a");
selector!(DUB_BADGE, "span.ep-status.dub");
selector!(NEXT_PAGE, "a.page-link[rel~=\"next\"]");
selector!(SERVER_TYPE, "div.type");
selector!(LIST_ITEM, "li");
selector!(PLAYER_AREA, "div.fix-area");
selector!(TITLE, "div.title");
selector!(SYNOPSIS, "div.desc.text-expand");
selector!(POSTER_IMG, ".poster img");
selector!(ALT_TITLE, "small.al-title");
selector!(DETAIL, "div.detail");
selector!(SPAN, "span");

static GENRE_HREF_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"genres/.+").unwrap());

/// One page of the `/filter` listing.
#[derive(Debug, Default)]
pub struct SearchPage {
    pub items: Vec<SearchResult>,
    pub has_next: bool,
}

pub fn parse_search_page(body: &str) -> SearchPage {
    let document = Html::parse_document(body);
    let has_next = document.select(&NEXT_PAGE).next().is_some();

    let items = document
        .select(&ITEM)
        .map(|item| {
            let identifier =
                safe_attr(select_first(item, &POSTER_TIP), "data-tip").unwrap_or_default();
            let name = safe_attr(
                select_first(item, &DIV).and_then(|div| select_first(div, &IMG)),
                "alt",
            );

            let mut languages = BTreeSet::from([LanguageType::Sub]);
            let has_dub = select_first(item, &ANCHOR)
                .and_then(|a| select_first(a, &DUB_BADGE))
                .is_some();
            if has_dub {
                languages.insert(LanguageType::Dub);
            }

            SearchResult::new(identifier, name, languages)
        })
        .collect();

    SearchPage { items, has_next }
}

/// One `<a>` of the episode listing fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeEntry {
    /// Raw `data-num`; `None` when absent or empty
    pub raw_number: Option<String>,
    pub episode_id: Option<String>,
    pub slug: Option<String>,
    pub mal_id: Option<String>,
    pub timestamp: Option<String>,
    pub sub: bool,
    pub dub: bool,
}

impl EpisodeEntry {
    pub fn is_available(&self, lang: LanguageType) -> bool {
        match lang {
            LanguageType::Sub => self.sub,
            LanguageType::Dub => self.dub,
        }
    }

    /// Parsed episode number. A present but non-numeric `data-num` means the
    /// listing format changed.
    pub fn number(&self) -> Result<Option<EpisodeNumber>, ProviderError> {
        match &self.raw_number {
            None => Ok(None),
            Some(raw) => EpisodeNumber::parse(raw).map(Some).ok_or_else(|| {
                ProviderError::layout(
                    Stage::EpisodeList,
                    format!("unparsable episode number {raw:?}"),
                )
            }),
        }
    }
}

fn non_empty_attr(element: ElementRef<'_>, attr: &str) -> Option<String> {
    safe_attr(Some(element), attr).filter(|v| !v.trim().is_empty())
}

pub fn parse_episode_list(fragment: &str) -> Vec<EpisodeEntry> {
    let document = Html::parse_fragment(fragment);
    document
        .select(&ANCHOR)
        .map(|a| EpisodeEntry {
            raw_number: non_empty_attr(a, "data-num"),
            episode_id: non_empty_attr(a, "data-ids"),
            slug: non_empty_attr(a, "data-slug"),
            mal_id: non_empty_attr(a, "data-mal"),
            timestamp: non_empty_attr(a, "data-timestamp"),
            sub: safe_attr(Some(a), "data-sub").as_deref() == Some("1"),
            dub: safe_attr(Some(a), "data-dub").as_deref() == Some("1"),
        })
        .collect()
}

/// Result of looking for a language's server in the server list fragment.
#[derive(Debug, PartialEq, Eq)]
pub enum ServerLookup {
    Found(String),
    /// A server group for the language exists but carries no link id
    MissingLink,
    NoMatchingType,
}

/// Finds the server reference for `lang`. When several groups declare the
/// same type the last one wins.
pub fn parse_server_list(fragment: &str, lang: LanguageType) -> ServerLookup {
    let document = Html::parse_fragment(fragment);
    let group = document
        .select(&SERVER_TYPE)
        .filter(|group| safe_attr(Some(*group), "data-type").as_deref() == Some(lang.as_ref()))
        .last();

    match group {
        None => ServerLookup::NoMatchingType,
        Some(group) => match safe_attr(select_first(group, &LIST_ITEM), "data-link-id") {
            Some(link) if !link.trim().is_empty() => ServerLookup::Found(link),
            _ => ServerLookup::MissingLink,
        },
    }
}

pub fn parse_player_id(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    safe_attr(document.select(&PLAYER_AREA).next(), "data-id").filter(|id| !id.is_empty())
}

fn parse_status(text: &str) -> Option<Status> {
    match text.trim() {
        "Info" => Some(Status::Upcoming),
        "Releasing" => Some(Status::Ongoing),
        "Completed" => Some(Status::Completed),
        other => {
            debug!(status = other, "Unknown status label");
            None
        }
    }
}

fn parse_premiered_year(text: &str) -> Option<u32> {
    text.split_whitespace().last()?.parse().ok()
}

/// Scrapes the `/watch/{id}` page. Each field is extracted on its own; a
/// missing node only unsets that field.
pub fn parse_info(body: &str) -> InfoResult {
    let document = Html::parse_document(body);
    let mut info = InfoResult {
        name: safe_text(document.select(&TITLE).next()),
        synopsis: safe_text(document.select(&SYNOPSIS).next()),
        image: safe_attr(document.select(&POSTER_IMG).next(), "src"),
        alternative_names: safe_text(document.select(&ALT_TITLE).next())
            .map(|names| {
                names
                    .split(';')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default(),
        ..InfoResult::default()
    };

    let Some(detail) = document.select(&DETAIL).next() else {
        debug!("No detail block on info page");
        return info;
    };

    for row in detail.select(&DIV) {
        match leading_text(row).as_deref() {
            Some("Genres:") => {
                info.genres = row
                    .select(&ANCHOR)
                    .filter(|a| {
                        a.value()
                            .attr("href")
                            .is_some_and(|href| GENRE_HREF_REGEX.is_match(href))
                    })
                    .filter_map(|a| safe_text(Some(a)))
                    .collect();
            }
            Some("Status:") => {
                info.status = safe_text(select_first(row, &SPAN)).and_then(|s| parse_status(&s));
            }
            Some("Premiered:") => {
                info.release_year =
                    safe_text(select_first(row, &ANCHOR)).and_then(|s| parse_premiered_year(&s));
            }
            _ => continue,
        }
    }

    info
}
