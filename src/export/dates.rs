//! Date parsing for export records.
//!
//! Export vintages disagree on date encoding, so parsing walks a fixed
//! list of formats in order and takes the first match. The order is part
//! of the contract: `%m/%d/%Y` is consulted before `%d/%m/%Y`, so an
//! ambiguous numeric date like `03/04/2024` resolves month-first. This is
//! a known accuracy limitation, not a bug to fix.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Textual formats tried in order. `true` marks formats carrying a time
/// component.
const DATE_FORMATS: &[(&str, bool)] = &[
    ("%Y-%m-%d %H:%M:%S", true),
    ("%Y-%m-%dT%H:%M:%SZ", true),
    ("%Y-%m-%dT%H:%M:%S%.fZ", true),
    ("%Y-%m-%d", false),
    ("%m/%d/%Y", false),
    ("%d/%m/%Y", false),
];

/// Parse a date string from an export record.
///
/// Tries the textual formats in order, then a millisecond epoch integer.
/// Returns `None` when nothing matches; the caller applies the lossy
/// "now" fallback and logs it.
pub fn parse_export_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for (format, has_time) in DATE_FORMATS {
        if *has_time {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(Utc.from_utc_datetime(&dt));
            }
        } else if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            let dt = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    // Last resort before giving up: a millisecond epoch integer.
    if let Ok(millis) = raw.parse::<i64>() {
        return Utc.timestamp_millis_opt(millis).single();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_datetime_format() {
        let dt = parse_export_date("2024-03-01 14:30:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-01T14:30:00+00:00");
    }

    #[test]
    fn test_iso_z_formats() {
        assert!(parse_export_date("2024-03-01T14:30:00Z").is_some());
        assert!(parse_export_date("2024-03-01T14:30:00.250Z").is_some());
    }

    #[test]
    fn test_date_only() {
        let dt = parse_export_date("2024-03-01").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 1));
    }

    #[test]
    fn test_ambiguous_slash_date_resolves_month_first() {
        // 03/04/2024 matches %m/%d/%Y before %d/%m/%Y ever runs.
        let dt = parse_export_date("03/04/2024").unwrap();
        assert_eq!((dt.month(), dt.day()), (3, 4));
    }

    #[test]
    fn test_day_first_when_month_slot_invalid() {
        // 25 cannot be a month, so %m/%d/%Y fails and %d/%m/%Y matches.
        let dt = parse_export_date("25/12/2023").unwrap();
        assert_eq!((dt.month(), dt.day()), (12, 25));
    }

    #[test]
    fn test_epoch_millis() {
        let dt = parse_export_date("1709294400000").unwrap();
        assert_eq!(dt.timestamp_millis(), 1709294400000);
    }

    #[test]
    fn test_unparseable_returns_none() {
        assert!(parse_export_date("not a date").is_none());
        assert!(parse_export_date("").is_none());
        assert!(parse_export_date("   ").is_none());
    }
}
