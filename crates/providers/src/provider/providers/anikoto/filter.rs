use crate::filter::{FilterCapabilities, FilterSchema, MediaType, Season, Status};

pub(super) const FILTER_CAPS: FilterCapabilities = FilterCapabilities::YEAR
    .union(FilterCapabilities::SEASON)
    .union(FilterCapabilities::STATUS)
    .union(FilterCapabilities::MEDIA_TYPE)
    .union(FilterCapabilities::NO_QUERY);

pub(super) static ANIKOTO_FILTER: FilterSchema = FilterSchema {
    caps: FILTER_CAPS,
    query_key: "keyword",
    year_key: "year[]",
    season_key: "season[]",
    seasons: &[
        (Season::Spring, "spring"),
        (Season::Summer, "summer"),
        (Season::Fall, "fall"),
        (Season::Winter, "winter"),
    ],
    status_key: "status[]",
    statuses: &[
        (Status::Upcoming, "info"),
        (Status::Ongoing, "releasing"),
        (Status::Completed, "completed"),
    ],
    media_type_key: "type[]",
    media_types: &[
        (MediaType::Movie, &["1"]),
        (MediaType::Tv, &["2"]),
        (MediaType::Ova, &["3"]),
        (MediaType::Special, &["4", "7"]),
        (MediaType::Ona, &["5"]),
        (MediaType::Music, &["6"]),
    ],
};
