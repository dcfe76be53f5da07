use serde::{Deserialize, Serialize};

use crate::filter::Status;

/// Title metadata scraped from a provider's detail page.
///
/// Every field is optional; a missing node on the page leaves its field unset
/// (or empty for the list fields) rather than failing the whole result.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoResult {
    pub name: Option<String>,
    pub image: Option<String>,
    pub genres: Vec<String>,
    pub synopsis: Option<String>,
    pub release_year: Option<u32>,
    pub status: Option<Status>,
    pub alternative_names: Vec<String>,
}
