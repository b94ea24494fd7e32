use chrono::{DateTime, Datelike, NaiveDate};

/// Layouts accepted for `date_added`, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y", // September 25, 2021 (also matches "Sep 25, 2021")
    "%m/%d/%Y",  // 1/1/2018
    "%Y-%m-%d",  // 2018-01-01
    "%Y/%m/%d",  // 2018/01/01
    "%d %B %Y",  // 25 September 2021
    "%B %d %Y",  // September 25 2021
];

/// Extract the calendar year from a free-text date.
///
/// Returns `None` for absent, blank or unparseable text and for years outside
/// the 4-digit range. The accepted layouts are fixed (see `DATE_FORMATS`),
/// which is stricter than a browser's `Date.parse`. Timestamps with an offset
/// keep the year of their own wall-clock date; no timezone conversion is done.
pub fn year_of(date_text: Option<&str>) -> Option<i32> {
    let text = date_text?.trim();
    if text.is_empty() {
        return None;
    }

    let year = parse_date(text)?.year();
    (1000..=9999).contains(&year).then_some(year)
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
    {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.date_naive());
    }

    // A bare year parses to January 1st of that year
    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        return text
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));
    }

    None
}
