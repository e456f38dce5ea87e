//! Conversions from chrono values and raw timestamp text into UTC instants.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Converts a chrono value into a UTC instant. Naive values are read as UTC wall time.
pub trait IntoUtcDateTime {
    fn into_utc(self) -> DateTime<Utc>;
}

impl IntoUtcDateTime for NaiveDateTime {
    fn into_utc(self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self)
    }
}

impl<Tz: TimeZone> IntoUtcDateTime for DateTime<Tz> {
    fn into_utc(self) -> DateTime<Utc> {
        self.with_timezone(&Utc)
    }
}

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%dT%H:%M%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 style timestamp into a UTC instant.
///
/// Accepts RFC 3339 (`2024-03-01T12:00:00Z`), date-times with or without seconds and with
/// an optional `±HH:MM` offset (the shape pandas writes for tz-aware columns, e.g.
/// `2024-03-01 12:00:00+00:00`), and a bare date, which is read as midnight. Text without
/// an offset is interpreted as UTC.
///
/// Returns `None` for anything else; callers treat that row as malformed.
///
/// # Examples
///
/// ```
/// use weather_features::parse_utc_timestamp;
///
/// let a = parse_utc_timestamp("2024-03-01T12:00").unwrap();
/// let b = parse_utc_timestamp("2024-03-01 14:00:00+02:00").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_utc_timestamp("yesterday").is_none());
/// ```
pub fn parse_utc_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.into_utc());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.into_utc());
        }
    }
    // A trailing 'Z' without seconds is not RFC 3339, but Open-Meteo style exports use it.
    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    for format in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(ndt.into_utc());
        }
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(IntoUtcDateTime::into_utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_parse_open_meteo_format() {
        assert_eq!(
            parse_utc_timestamp("2024-05-01T13:00"),
            Some(utc(2024, 5, 1, 13, 0))
        );
    }

    #[test]
    fn test_parse_pandas_tz_aware_format() {
        assert_eq!(
            parse_utc_timestamp("2024-05-01 13:00:00+00:00"),
            Some(utc(2024, 5, 1, 13, 0))
        );
        assert_eq!(
            parse_utc_timestamp("2024-05-01 08:00:00-05:00"),
            Some(utc(2024, 5, 1, 13, 0))
        );
    }

    #[test]
    fn test_parse_rfc3339_and_zulu() {
        assert_eq!(
            parse_utc_timestamp("2024-05-01T13:00:00Z"),
            Some(utc(2024, 5, 1, 13, 0))
        );
        assert_eq!(
            parse_utc_timestamp("2024-05-01T13:00Z"),
            Some(utc(2024, 5, 1, 13, 0))
        );
    }

    #[test]
    fn test_parse_bare_date_is_midnight() {
        assert_eq!(parse_utc_timestamp("2024-05-01"), Some(utc(2024, 5, 1, 0, 0)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for raw in ["", "   ", "not a time", "2024-13-01T00:00", "2024-05-01T25:00"] {
            assert!(parse_utc_timestamp(raw).is_none(), "accepted {:?}", raw);
        }
    }

    #[test]
    fn test_into_utc_from_fixed_offset() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2024, 1, 1, 18, 30, 0).unwrap();
        assert_eq!(local.into_utc(), utc(2024, 1, 1, 23, 30));
    }
}
