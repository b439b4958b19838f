//! Best-effort structuring of a spoken accident location.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parsed::Parsed;
use crate::schema::StructuredLocation;

static ZIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{5})\b").expect("zip regex must compile"));
static STATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z]{2})\b").expect("state regex must compile"));
static CITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][A-Za-z]*(?:\s+[A-Z][A-Za-z]*)*)$").expect("city regex must compile")
});

/// Pull state, city and ZIP out of free text.
///
/// Later matches win for ZIP and state, since spoken addresses end with
/// them. The city is the run of capitalized words right before the state.
/// `road` always carries the full original text and `country` is fixed.
pub fn parse_location(text: &str) -> Parsed<StructuredLocation> {
    let mut location = StructuredLocation::unstructured(text);

    if let Some(zip) = ZIP_RE.captures_iter(text).last() {
        location.zip = zip[1].to_string();
    }

    if let Some(state) = STATE_RE.find_iter(text).last() {
        location.state = state.as_str().to_string();

        let before = text[..state.start()].trim_end();
        let before = before.strip_suffix(',').unwrap_or(before).trim();
        if let Some(city) = CITY_RE.captures(before) {
            location.city = city[1].to_string();
        }
    }

    if location.state.is_empty() && location.city.is_empty() && location.zip.is_empty() {
        Parsed::RawFallback(location)
    } else {
        Parsed::Structured(location)
    }
}
