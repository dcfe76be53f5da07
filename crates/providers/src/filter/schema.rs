use thiserror::Error;
use tracing::debug;

use super::{
    FilterCapabilities, FilterPredicate, FilterRequest, Filters, MediaType, Season, Status,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The provider declares the capability but its translation table has no
    /// entry for the value: the enum and the table are out of sync.
    #[error("no {predicate} translation for {value} in provider filter table")]
    CapabilityMismatch {
        predicate: FilterPredicate,
        value: String,
    },
}

/// Declarative description of how one provider spells structured predicates.
///
/// Providers declare this as a `static`; the engine in [`FilterSchema::apply`]
/// stays provider-agnostic.
#[derive(Debug, Clone, Copy)]
pub struct FilterSchema {
    pub caps: FilterCapabilities,
    pub query_key: &'static str,
    pub year_key: &'static str,
    pub season_key: &'static str,
    pub seasons: &'static [(Season, &'static str)],
    pub status_key: &'static str,
    pub statuses: &'static [(Status, &'static str)],
    pub media_type_key: &'static str,
    pub media_types: &'static [(MediaType, &'static [&'static str])],
}

fn lookup<K: PartialEq + Copy, V: Copy>(table: &[(K, V)], key: K) -> Option<V> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

impl FilterSchema {
    pub fn supports(&self, predicate: FilterPredicate) -> bool {
        self.caps.contains(predicate.capability())
    }

    /// Writes `query` and every supported predicate of `filters` into
    /// `request`. Unsupported predicates leave the request untouched.
    pub fn apply(
        &self,
        request: &mut FilterRequest,
        query: &str,
        filters: &Filters,
    ) -> Result<(), FilterError> {
        request.set_one(self.query_key, query);

        if let Some(year) = filters.year {
            if self.supports(FilterPredicate::Year) {
                request.set_one(self.year_key, year.to_string());
            } else {
                debug!(year, "Provider does not filter by year; dropping");
            }
        }

        if let Some(season) = filters.season {
            if self.supports(FilterPredicate::Season) {
                let token = lookup(self.seasons, season).ok_or_else(|| {
                    FilterError::CapabilityMismatch {
                        predicate: FilterPredicate::Season,
                        value: season.to_string(),
                    }
                })?;
                request.set_one(self.season_key, token);
            } else {
                debug!(%season, "Provider does not filter by season; dropping");
            }
        }

        if let Some(status) = filters.status {
            if self.supports(FilterPredicate::Status) {
                let token = lookup(self.statuses, status).ok_or_else(|| {
                    FilterError::CapabilityMismatch {
                        predicate: FilterPredicate::Status,
                        value: status.to_string(),
                    }
                })?;
                request.set_one(self.status_key, token);
            } else {
                debug!(%status, "Provider does not filter by status; dropping");
            }
        }

        if let Some(media_type) = filters.media_type {
            if self.supports(FilterPredicate::MediaType) {
                let codes = lookup(self.media_types, media_type).ok_or_else(|| {
                    FilterError::CapabilityMismatch {
                        predicate: FilterPredicate::MediaType,
                        value: media_type.to_string(),
                    }
                })?;
                request.set(self.media_type_key, codes.iter().copied());
            } else {
                debug!(%media_type, "Provider does not filter by media type; dropping");
            }
        }

        Ok(())
    }
}
