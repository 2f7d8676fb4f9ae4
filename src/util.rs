use chrono::{DateTime, Datelike, Utc};
use std::path::Path;

pub fn month_key(timestamp: &DateTime<Utc>) -> String {
    format!("{}-{:02}", timestamp.year(), timestamp.month())
}

/// Bare lowercase extension of `path`, or `None` when it has none.
pub fn extension_key(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}
