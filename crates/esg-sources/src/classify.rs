//! Source credibility classification and date helpers

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use esg_core::SourceType;
use esg_core::state::UNKNOWN_FRESHNESS_DAYS;

const GOVERNMENT_DOMAINS: &[&str] = &[
    ".gov",
    "sec.gov",
    "epa.gov",
    "europa.eu",
    "sebi.gov.in",
    "fca.org.uk",
    "asic.gov.au",
];

const NGO_DOMAINS: &[&str] = &[
    "greenpeace.org",
    "wwf.org",
    "amnesty.org",
    "ran.org",
    "corporatewatch.org",
    "globalwitness.org",
    "oxfam.org",
    "hrw.org",
    "earthjustice.org",
    "350.org",
    "climateaction.org",
];

const ACADEMIC_DOMAINS: &[&str] = &[
    "scholar.google",
    "researchgate",
    "arxiv.org",
    ".edu",
    "jstor",
    "nature.com",
];

const TIER1_DOMAINS: &[&str] = &[
    "reuters.com",
    "bloomberg.com",
    "ft.com",
    "wsj.com",
    "economist.com",
    "financial-times.com",
];

const GENERAL_MEDIA: &[&str] = &[
    "guardian",
    "nytimes",
    "bbc",
    "cnn",
    "forbes",
    "theguardian",
    "apnews",
    "npr.org",
    "aljazeera",
    "dw.com",
];

const ESG_PLATFORMS: &[&str] = &[
    "sustainability",
    "esg",
    "csrhub",
    "msci.com",
    "sustainalytics",
    "cdp.net",
    "globalreporting.org",
    "sasb.org",
];

const COMPANY_TERMS: &[&str] = &[
    "press release",
    "investor relations",
    "corporate",
    "company announcement",
];

const SPONSORED_TERMS: &[&str] = &["sponsored", "advertorial", "paid", "partner content"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classify a source from its URL and publisher name
///
/// Checks run in credibility order, so a `.gov` URL wins over a publisher
/// name that looks corporate.
pub fn classify_source(url: &str, source_name: &str) -> SourceType {
    let url = url.to_lowercase();
    let name = source_name.to_lowercase();

    if contains_any(&url, GOVERNMENT_DOMAINS) {
        SourceType::GovernmentRegulatory
    } else if contains_any(&url, NGO_DOMAINS) {
        SourceType::Ngo
    } else if contains_any(&url, ACADEMIC_DOMAINS) {
        SourceType::Academic
    } else if contains_any(&url, TIER1_DOMAINS) {
        SourceType::Tier1FinancialMedia
    } else if contains_any(&name, GENERAL_MEDIA) || contains_any(&url, GENERAL_MEDIA) {
        SourceType::GeneralMedia
    } else if contains_any(&url, ESG_PLATFORMS) {
        SourceType::EsgPlatform
    } else if contains_any(&name, COMPANY_TERMS) {
        SourceType::CompanyControlled
    } else if contains_any(&name, SPONSORED_TERMS) {
        SourceType::SponsoredContent
    } else {
        SourceType::WebSource
    }
}

/// Credibility tier of a news outlet from its name alone
pub fn news_source_tier(source_name: &str) -> SourceType {
    let name = source_name.to_lowercase();

    if contains_any(
        &name,
        &["reuters", "bloomberg", "financial times", "ft.com", "wsj", "wall street journal"],
    ) {
        SourceType::Tier1FinancialMedia
    } else if contains_any(&name, &["cnbc", "forbes", "economist", "guardian", "nytimes", "bbc"]) {
        SourceType::GeneralMedia
    } else {
        SourceType::NewsSource
    }
}

/// Host part of a URL, lowercased
pub fn domain_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.trim_start_matches("www.").to_lowercase())
}

/// Parse the date formats the supported APIs return
///
/// Accepts RFC 3339 (`2024-05-01T12:00:00Z`), `2024-05-01 12:00:00` (taken as
/// UTC) and bare `2024-05-01`.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Whole days between publication and `now`, 999 when the date is unknown
pub fn freshness_days(date: Option<&str>, now: DateTime<Utc>) -> u32 {
    date.and_then(parse_date)
        .map_or(UNKNOWN_FRESHNESS_DAYS, |published| {
            (now - published).num_days().max(0) as u32
        })
}
