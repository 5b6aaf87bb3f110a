//! Listing filter composition.
//!
//! Facet filters (category, country) and the free-text query combine into one
//! predicate over the agency collection. Everything here is a pure function of
//! its inputs; the `SearchFilters` value itself is owned by the caller.

use crate::models::{Agency, FilterChip, FilterKey, SearchFilters};

/// apply
///
/// Returns the records passing every present filter, in their original order.
/// Facets match exactly and case-sensitively. The query matches
/// case-insensitively as a substring of the name, the description or the city.
pub fn apply<'a>(records: &'a [Agency], filters: &SearchFilters) -> Vec<&'a Agency> {
    let needle = filters
        .query
        .as_deref()
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    records
        .iter()
        .filter(|agency| matches(agency, filters, needle.as_deref()))
        .collect()
}

fn matches(agency: &Agency, filters: &SearchFilters, needle: Option<&str>) -> bool {
    if let Some(category) = filters.category.as_deref() {
        if !agency.category.iter().any(|c| c == category) {
            return false;
        }
    }

    if let Some(country) = filters.country.as_deref() {
        if agency.country != country {
            return false;
        }
    }

    match needle {
        Some(needle) => {
            contains_lowercase(&agency.name, needle)
                || agency
                    .description
                    .as_deref()
                    .is_some_and(|d| contains_lowercase(d, needle))
                || contains_lowercase(&agency.city, needle)
        }
        None => true,
    }
}

/// Substring test against an already lower-cased needle.
pub(crate) fn contains_lowercase(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// describe_active_filters
///
/// One chip per present facet, category first. The free-text query never gets
/// a chip. An empty result tells the view to render no filter bar at all.
pub fn describe_active_filters(filters: &SearchFilters) -> Vec<FilterChip> {
    let facets = [
        (FilterKey::Category, filters.category.as_deref()),
        (FilterKey::Country, filters.country.as_deref()),
    ];

    facets
        .into_iter()
        .filter_map(|(key, value)| {
            value.map(|value| FilterChip {
                label: format!("{}: {}", key.human_name(), value),
                remove: key,
                remove_query: key.clear(filters).to_query_string(),
            })
        })
        .collect()
}

/// reset
///
/// Clears both facets. The free-text query is kept: "clear filters" and
/// "clear search" are separate actions.
pub fn reset(filters: &SearchFilters) -> SearchFilters {
    SearchFilters {
        category: None,
        country: None,
        query: filters.query.clone(),
    }
}

impl FilterKey {
    pub fn human_name(&self) -> &'static str {
        match self {
            FilterKey::Category => "Category",
            FilterKey::Country => "Country",
        }
    }

    /// Returns `filters` with only this facet set back to absent.
    pub fn clear(&self, filters: &SearchFilters) -> SearchFilters {
        let mut next = filters.clone();
        match self {
            FilterKey::Category => next.category = None,
            FilterKey::Country => next.country = None,
        }
        next
    }
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.country.is_none() && self.query.is_none()
    }

    /// to_query_string
    ///
    /// URL form of the snapshot, without the leading `?`. Present fields are
    /// written in the order query, category, country; `""` when none are present.
    pub fn to_query_string(&self) -> String {
        [
            ("query", self.query.as_deref()),
            ("category", self.category.as_deref()),
            ("country", self.country.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}={}", key, urlencoding::encode(v)))
        })
        .collect::<Vec<_>>()
        .join("&")
    }
}
