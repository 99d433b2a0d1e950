use chrono::{DateTime, Local, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

/// strftime layout of a release id, e.g. `20240115093000.123`.
pub const RELEASE_ID_FORMAT: &str = "%Y%m%d%H%M%S%.3f";
pub const CURRENT_LINK_NAME: &str = "current";
pub const DEFAULT_KEEP: usize = 3;

// ASCII digits and ASCII word boundaries only.
static RELEASE_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u:\b)[0-9]{14}\.[0-9]{3}(?-u:\b)").expect("release id pattern must compile")
});

pub fn new_release_id() -> String {
    release_id_at(&Local::now())
}

pub fn release_id_at<Tz>(instant: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    instant.format(RELEASE_ID_FORMAT).to_string()
}

/// Matches the id pattern anywhere in `name` as a whole word, not the whole name.
pub fn is_release_id(name: &str) -> bool {
    RELEASE_ID_RE.is_match(name)
}

pub fn find_release_id(text: &str) -> Option<&str> {
    RELEASE_ID_RE.find(text).map(|found| found.as_str())
}
