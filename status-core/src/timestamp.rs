//! Display strings for backup start times.

use chrono::{Local, TimeZone};
use std::fmt::Display;

/// Shown for a zero or unrepresentable epoch.
pub const NEVER: &str = "never";

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render Unix epoch seconds in the local time zone.
pub fn format_epoch(secs: i64) -> String {
    format_epoch_in(secs, &Local)
}

pub fn format_epoch_in<Tz>(secs: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if secs == 0 {
        return NEVER.to_string();
    }
    match tz.timestamp_opt(secs, 0).earliest() {
        Some(time) => time.format(DATE_FORMAT).to_string(),
        None => NEVER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_format_utc() {
        assert_eq!(format_epoch_in(1_700_000_000, &Utc), "2023-11-14 22:13:20");
    }

    #[test]
    fn test_format_fixed_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(format_epoch_in(86_400, &tz), "1970-01-02 02:00:00");
    }

    #[test]
    fn test_zero_and_out_of_range() {
        assert_eq!(format_epoch_in(0, &Utc), NEVER);
        assert_eq!(format_epoch_in(i64::MAX, &Utc), NEVER);
        assert_eq!(format_epoch(0), NEVER);
    }

    #[test]
    fn test_local_has_fixed_shape() {
        let shown = format_epoch(1_600_000_000);
        assert_eq!(shown.len(), 19);
        assert_eq!(&shown[4..5], "-");
    }
}
