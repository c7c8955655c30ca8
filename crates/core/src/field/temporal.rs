//! Date, time and timestamp parsing for temporal field kinds.
//!
//! Format strings use the `time` crate's format description syntax, e.g.
//! `[year]-[month]-[day] [hour]:[minute]:[second]`. Time zones are fixed
//! UTC offsets.

use time::error::InvalidFormatDescription;
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

pub const DEFAULT_DATE_FORMAT: &str = "[year]-[month]-[day]";
pub const DEFAULT_TIME_FORMAT: &str = "[hour]:[minute]:[second]";
pub const DEFAULT_DATETIME_FORMAT: &str = "[year]-[month]-[day] [hour]:[minute]:[second]";

/// Parse a configured time zone: `UTC`, `Z`, `GMT`, `+03:30`, `-0500`.
pub fn parse_time_zone(zone: &str) -> Result<UtcOffset, String> {
    let zone = zone.trim();
    if matches!(zone, "UTC" | "utc" | "Z" | "GMT") {
        return Ok(UtcOffset::UTC);
    }
    let (sign, rest) = match zone.as_bytes().first() {
        Some(b'+') => (1i8, &zone[1..]),
        Some(b'-') => (-1i8, &zone[1..]),
        _ => return Err(format!("unsupported time zone '{}'", zone)),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("unsupported time zone '{}'", zone));
    }
    let hours: i8 = digits[..2].parse().map_err(|_| format!("bad hours in '{}'", zone))?;
    let minutes: i8 = digits[2..].parse().map_err(|_| format!("bad minutes in '{}'", zone))?;
    UtcOffset::from_hms(sign * hours, sign * minutes, 0).map_err(|e| e.to_string())
}

fn description(format: &str) -> Result<Vec<BorrowedFormatItem<'_>>, InvalidFormatDescription> {
    time::format_description::parse_borrowed::<2>(format)
}

/// Check that a format description string is well formed.
pub fn check_format(format: &str) -> Result<(), String> {
    description(format)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

pub fn parse_date(text: &str, format: &str) -> Option<Date> {
    let items = description(format).ok()?;
    Date::parse(text, &items).ok()
}

pub fn parse_time(text: &str, format: &str) -> Option<Time> {
    let items = description(format).ok()?;
    Time::parse(text, &items).ok()
}

/// Parse a date-time with a declared format. Text without an offset is
/// placed in `zone`.
pub fn parse_datetime(text: &str, format: &str, zone: UtcOffset) -> Option<OffsetDateTime> {
    let items = description(format).ok()?;
    if let Ok(dt) = OffsetDateTime::parse(text, &items) {
        return Some(dt);
    }
    if let Ok(dt) = PrimitiveDateTime::parse(text, &items) {
        return Some(dt.assume_offset(zone));
    }
    Date::parse(text, &items)
        .ok()
        .map(|d| d.midnight().assume_offset(zone))
}

/// Parse a date-time without a declared format.
///
/// Accepts RFC 3339, ISO 8601 and the common `date time` layouts, with or
/// without fractional seconds, and a bare date as midnight.
pub fn parse_datetime_free_form(text: &str, zone: UtcOffset) -> Option<OffsetDateTime> {
    let text = text.trim();
    if let Ok(dt) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(dt);
    }
    if let Ok(dt) = OffsetDateTime::parse(text, &Iso8601::DEFAULT) {
        return Some(dt);
    }

    let zoned = [
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
        ),
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
        ),
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] [offset_hour sign:mandatory]:[offset_minute]"
        ),
    ];
    for layout in zoned {
        if let Ok(dt) = OffsetDateTime::parse(text, layout) {
            return Some(dt);
        }
    }

    let local = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
        format_description!("[year]/[month]/[day] [hour]:[minute]:[second]"),
        format_description!("[year]/[month]/[day] [hour]:[minute]"),
    ];
    for layout in local {
        if let Ok(dt) = PrimitiveDateTime::parse(text, layout) {
            return Some(dt.assume_offset(zone));
        }
    }

    let dates = [
        format_description!("[year]-[month]-[day]"),
        format_description!("[year]/[month]/[day]"),
    ];
    for layout in dates {
        if let Ok(d) = Date::parse(text, layout) {
            return Some(d.midnight().assume_offset(zone));
        }
    }
    None
}

pub fn format_date(date: Date, format: &str) -> Result<String, String> {
    let items = description(format).map_err(|e| e.to_string())?;
    date.format(&items).map_err(|e| e.to_string())
}

pub fn format_time(t: Time, format: &str) -> Result<String, String> {
    let items = description(format).map_err(|e| e.to_string())?;
    t.format(&items).map_err(|e| e.to_string())
}

pub fn format_datetime(dt: OffsetDateTime, format: Option<&str>) -> Result<String, String> {
    match format {
        Some(format) => {
            let items = description(format).map_err(|e| e.to_string())?;
            dt.format(&items).map_err(|e| e.to_string())
        }
        None => dt.format(&Rfc3339).map_err(|e| e.to_string()),
    }
}

pub fn from_unix_seconds(secs: i64, zone: UtcOffset) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(secs)
        .ok()
        .and_then(|dt| dt.checked_to_offset(zone))
}

pub fn from_unix_millis(millis: i64, zone: UtcOffset) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|dt| dt.checked_to_offset(zone))
}

pub fn to_unix_millis(dt: OffsetDateTime) -> i64 {
    (dt.unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, offset, time};

    #[test]
    fn test_time_zone_forms() {
        assert_eq!(parse_time_zone("UTC").unwrap(), UtcOffset::UTC);
        assert_eq!(parse_time_zone("+03:30").unwrap(), offset!(+3:30));
        assert_eq!(parse_time_zone("-0500").unwrap(), offset!(-5));
        assert!(parse_time_zone("Asia/Tehran").is_err());
        assert!(parse_time_zone("+3").is_err());
    }

    #[test]
    fn test_declared_formats() {
        assert_eq!(
            parse_date("2021-02-28", DEFAULT_DATE_FORMAT),
            Some(date!(2021-02-28))
        );
        assert_eq!(parse_date("2021-02-30", DEFAULT_DATE_FORMAT), None);
        assert_eq!(
            parse_time("23:59:01", DEFAULT_TIME_FORMAT),
            Some(time!(23:59:01))
        );
        assert_eq!(
            parse_datetime("2020-05-01 10:00:00", DEFAULT_DATETIME_FORMAT, offset!(+2)),
            Some(datetime!(2020-05-01 10:00:00 +2))
        );
    }

    #[test]
    fn test_free_form_respects_explicit_offset() {
        let dt = parse_datetime_free_form("2020-05-01T10:00:00+04:30", offset!(+2)).unwrap();
        assert_eq!(dt.offset(), offset!(+4:30));

        let local = parse_datetime_free_form("2020-05-01 10:00", offset!(+2)).unwrap();
        assert_eq!(local, datetime!(2020-05-01 10:00:00 +2));

        let bare = parse_datetime_free_form("2020/05/01", UtcOffset::UTC).unwrap();
        assert_eq!(bare, datetime!(2020-05-01 00:00:00 UTC));

        assert!(parse_datetime_free_form("yesterday", UtcOffset::UTC).is_none());
    }

    #[test]
    fn test_unix_round_trip() {
        let dt = from_unix_millis(1_600_000_000_123, offset!(+1)).unwrap();
        assert_eq!(dt.offset(), offset!(+1));
        assert_eq!(to_unix_millis(dt), 1_600_000_000_123);
        assert_eq!(
            from_unix_seconds(0, UtcOffset::UTC).unwrap(),
            datetime!(1970-01-01 00:00:00 UTC)
        );
    }
}
