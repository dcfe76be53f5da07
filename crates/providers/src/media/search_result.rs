use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::LanguageType;

/// One title found by a provider search.
///
/// `identifier` is the site-local key accepted by every other provider
/// operation. Fields missing from the listing markup degrade to empty values
/// instead of dropping the entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub identifier: String,
    pub name: Option<String>,
    pub languages: BTreeSet<LanguageType>,
}

impl SearchResult {
    pub fn new(
        identifier: impl Into<String>,
        name: Option<String>,
        languages: BTreeSet<LanguageType>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name,
            languages,
        }
    }

    pub fn has_language(&self, lang: LanguageType) -> bool {
        self.languages.contains(&lang)
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let languages = self
            .languages
            .iter()
            .map(LanguageType::as_ref)
            .collect::<Vec<_>>()
            .join("/");
        write!(
            f,
            "{} [{}] ({})",
            self.name.as_deref().unwrap_or("<untitled>"),
            languages,
            self.identifier
        )
    }
}
