pub mod episode;
pub mod info_result;
pub mod language;
pub mod search_result;
pub mod stream;

pub use episode::EpisodeNumber;
pub use info_result::InfoResult;
pub use language::{LanguageType, language_code2};
pub use search_result::SearchResult;
pub use stream::{
    ExternalSubtitle, QualityPreference, StreamRendition, SubtitleSet, select_rendition,
};
