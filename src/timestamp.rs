//! Server timestamps are ISO-like strings, sometimes without a zone.

use std::sync::LazyLock;

use chrono::{DateTime, Local, Utc};
use regex::Regex;

static ZONELESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?$").expect("static pattern")
});

/// Parses a server timestamp. A timestamp without a zone designator is UTC.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = if ZONELESS.is_match(raw) {
        DateTime::parse_from_rfc3339(&format!("{raw}Z"))
    } else {
        DateTime::parse_from_rfc3339(raw)
    };

    parsed.ok().map(|time| time.with_timezone(&Utc))
}

/// Sort key for a timestamp; anything unparseable sorts as the epoch.
pub fn sort_key(raw: &str) -> DateTime<Utc> {
    parse(raw).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Local `HH:MM` for display; empty when the timestamp is unparseable.
pub fn format_clock(raw: &str) -> String {
    parse(raw)
        .map(|time| time.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Current time in the form the server issues.
pub fn now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoneless_timestamp_is_utc() {
        assert_eq!(
            parse("2025-08-14T05:05:00"),
            parse("2025-08-14T05:05:00Z")
        );
        assert!(parse("2025-08-14T05:05:00.123").is_some());
    }

    #[test]
    fn offsets_are_honoured() {
        assert_eq!(
            parse("2025-08-14T07:05:00+02:00"),
            parse("2025-08-14T05:05:00Z")
        );
    }

    #[test]
    fn garbage_sorts_first_and_renders_empty() {
        let mut keys = vec![
            sort_key("2025-08-14T05:05:00"),
            sort_key("garbage"),
            sort_key("1999-01-01T00:00:00Z"),
        ];
        keys.sort();
        assert_eq!(keys[0], DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(format_clock("garbage"), "");
        assert_eq!(format_clock(""), "");
    }

    #[test]
    fn clock_has_hours_and_minutes() {
        let rendered = format_clock("2025-08-14T05:05:00Z");
        assert_eq!(rendered.len(), 5);
        assert_eq!(&rendered[2..3], ":");
    }

    #[test]
    fn now_round_trips() {
        assert!(parse(&now()).is_some());
    }
}
