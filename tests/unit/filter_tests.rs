/*!
 * Tests for language/country/category filtering
 */

use m3u_curator::filter::{
    FilterCriteria, REASON_CATEGORY, REASON_COUNTRY, REASON_LANG, REASON_OK, passes_filters,
};

use crate::common;

fn criteria(langs: &[&str], countries: &[&str], categories: &[&str]) -> FilterCriteria {
    FilterCriteria::new(
        langs.iter().map(|s| s.to_string()).collect(),
        countries.iter().map(|s| s.to_string()).collect(),
        categories.iter().map(|s| s.to_string()).collect(),
    )
}

/// Empty criteria lists accept every entry
#[test]
fn test_passes_filters_withNoCriteria_shouldAcceptEverything() {
    let entry = common::entry("Anything", "http://host/a");
    let (ok, reason) = passes_filters(&entry, &FilterCriteria::default());
    assert!(ok);
    assert_eq!(reason, REASON_OK);
}

/// Language matching is a case-insensitive exact match on the field
#[test]
fn test_passes_filters_withUppercaseLanguageField_shouldAccept() {
    let entry = common::tagged_entry("Chaine", "http://host/a", Some("FR"), None, None);
    let (ok, reason) = passes_filters(&entry, &criteria(&["fr"], &[], &[]));
    assert!(ok);
    assert_eq!(reason, REASON_OK);
}

/// The parenthesized language heuristic rescues entries without a field
#[test]
fn test_passes_filters_withParenLanguageInName_shouldAccept() {
    let entry = common::entry("Channel (fr)", "http://host/a");
    let (ok, _) = passes_filters(&entry, &criteria(&["fr"], &[], &[]));
    assert!(ok);
}

/// No field and no heuristic match rejects on that axis
#[test]
fn test_passes_filters_withUnmatchedLanguage_shouldRejectWithLangReason() {
    let entry = common::tagged_entry("Kanal", "http://host/a", Some("de"), None, None);
    let (ok, reason) = passes_filters(&entry, &criteria(&["fr"], &[], &[]));
    assert!(!ok);
    assert_eq!(reason, REASON_LANG);
}

/// The bracketed country heuristic applies to the display name
#[test]
fn test_passes_filters_withBracketCountryInName_shouldAccept() {
    let entry = common::entry("News [CA]", "http://host/a");
    let (ok, _) = passes_filters(&entry, &criteria(&[], &["ca"], &[]));
    assert!(ok);
}

/// Categories have no display-name heuristic
#[test]
fn test_passes_filters_withCategoryOnlyInName_shouldReject() {
    let entry = common::entry("Sport Channel (sport)", "http://host/a");
    let (ok, reason) = passes_filters(&entry, &criteria(&[], &[], &["sport"]));
    assert!(!ok);
    assert_eq!(reason, REASON_CATEGORY);
}

/// Category field matching is case-insensitive
#[test]
fn test_passes_filters_withCategoryField_shouldAccept() {
    let entry = common::tagged_entry("TSN", "http://host/a", None, None, Some("SPORT"));
    let (ok, _) = passes_filters(&entry, &criteria(&[], &[], &["sport"]));
    assert!(ok);
}

/// Axes short-circuit in order language, country, category
#[test]
fn test_passes_filters_withAllAxesFailing_shouldReportFirstFailingAxis() {
    let entry = common::tagged_entry("Plain", "http://host/a", Some("de"), Some("DE"), Some("Kids"));
    let all = criteria(&["fr"], &["CA"], &["News"]);
    let (_, reason) = passes_filters(&entry, &all);
    assert_eq!(reason, REASON_LANG);

    let lang_ok = criteria(&["de"], &["CA"], &["News"]);
    let (_, reason) = passes_filters(&entry, &lang_ok);
    assert_eq!(reason, REASON_COUNTRY);

    let lang_country_ok = criteria(&["de"], &["DE"], &["News"]);
    let (_, reason) = passes_filters(&entry, &lang_country_ok);
    assert_eq!(reason, REASON_CATEGORY);
}

/// The language axis falls back to tvg-name when no language field is set
#[test]
fn test_passes_filters_withTvgNameAsLanguage_shouldUseFallback() {
    let mut entry = common::entry("Channel", "http://host/a");
    entry.tvg_name = Some("fr".to_string());
    let (ok, _) = passes_filters(&entry, &criteria(&["FR"], &[], &[]));
    assert!(ok);
}

/// A blank language field falls through to tvg-name like an absent one
#[test]
fn test_passes_filters_withBlankLanguageField_shouldUseFallback() {
    let mut entry = common::tagged_entry("Channel", "http://host/a", Some(""), None, None);
    entry.tvg_name = Some("fr".to_string());
    let (ok, _) = passes_filters(&entry, &criteria(&["fr"], &[], &[]));
    assert!(ok);
}

/// Multi-tag names match when any listed code appears
#[test]
fn test_passes_filters_withMultipleBracketTags_shouldAcceptAnyListedCode() {
    let entry = common::entry("Info [CA][FR]", "http://host/a");
    let (ok, _) = passes_filters(&entry, &criteria(&[], &["fr"], &[]));
    assert!(ok);
}
