//! DateTime display utilities.
//!
//! Timestamps are stored in UTC and shown in the system timezone.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS TZ` in the system timezone.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

/// Formats an optional run date as `YYYY-MM-DD` in the system timezone, or
/// `-` when unset.
pub struct LocalDate<'a>(pub Option<&'a Timestamp>);

impl fmt::Display for LocalDate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ts) => write!(
                f,
                "{}",
                ts.to_zoned(TimeZone::system()).strftime("%Y-%m-%d")
            ),
            None => write!(f, "-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_datetime_shape() {
        let ts = Timestamp::from_second(1_700_000_000).unwrap();
        let output = LocalDateTime(&ts).to_string();
        // "YYYY-MM-DD HH:MM:SS TZ"
        assert_eq!(&output[4..5], "-");
        assert_eq!(&output[10..11], " ");
        assert_eq!(&output[13..14], ":");
    }

    #[test]
    fn test_local_date_unset() {
        assert_eq!(LocalDate(None).to_string(), "-");
    }
}
