use crate::playlist::Entry;

// @module: Accept/reject decisions against language/country/category criteria

/// Reason tags attached to filter decisions.
pub const REASON_OK: &str = "ok";
pub const REASON_LANG: &str = "lang_filter";
pub const REASON_COUNTRY: &str = "country_filter";
pub const REASON_CATEGORY: &str = "category_filter";

/// Optional criteria lists; an empty list means no constraint on that axis.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub languages: Vec<String>,
    pub countries: Vec<String>,
    pub categories: Vec<String>,
}

impl FilterCriteria {
    pub fn new(languages: Vec<String>, countries: Vec<String>, categories: Vec<String>) -> Self {
        FilterCriteria {
            languages,
            countries,
            categories,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.languages.is_empty() && self.countries.is_empty() && self.categories.is_empty()
    }
}

/// Check one entry against the criteria. Axes are checked in the order
/// language, country, category; the first failing axis names the reason.
///
/// Matching on each axis is a case-insensitive exact match against the
/// entry's field, or a display-name heuristic: a language code wrapped in
/// parentheses (`(fr)`) or a country code wrapped in brackets (`[CA]`).
/// The category axis deliberately has no display-name heuristic. The
/// language axis falls back to `tvg_name` when the `language` field is
/// absent or blank.
pub fn passes_filters(entry: &Entry, criteria: &FilterCriteria) -> (bool, &'static str) {
    let lang = norm(
        entry
            .language
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(entry.tvg_name.as_deref()),
    );
    let country = norm(entry.country.as_deref());
    let category = norm(entry.category.as_deref());
    let name = norm(Some(&entry.name));

    if !criteria.languages.is_empty() {
        let field_match = criteria.languages.iter().any(|l| l.to_lowercase() == lang);
        let name_match = criteria
            .languages
            .iter()
            .any(|l| name.contains(&format!("({})", l.to_lowercase())));
        if !field_match && !name_match {
            return (false, REASON_LANG);
        }
    }

    if !criteria.countries.is_empty() {
        let field_match = criteria.countries.iter().any(|c| c.to_lowercase() == country);
        let name_match = criteria
            .countries
            .iter()
            .any(|c| name.contains(&format!("[{}]", c.to_lowercase())));
        if !field_match && !name_match {
            return (false, REASON_COUNTRY);
        }
    }

    if !criteria.categories.is_empty() {
        let field_match = criteria.categories.iter().any(|g| g.to_lowercase() == category);
        if !field_match {
            return (false, REASON_CATEGORY);
        }
    }

    (true, REASON_OK)
}

fn norm(value: Option<&str>) -> String {
    value.unwrap_or("").trim().to_lowercase()
}
