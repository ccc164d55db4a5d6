//! Wall-clock abstraction and `Date` header formatting.
//!
//! The parser stamps messages that lack a `Date` header with the current
//! time. Reading that time goes through the [`Clock`] trait so tests can
//! pin it.
//!
//! # Example
//!
//! ```
//! use chrono::DateTime;
//! use mailledger_eml::time::{format_date, Clock, FixedClock};
//!
//! let instant = DateTime::parse_from_rfc2822("Mon, 02 Jan 2006 15:04:05 -0700").unwrap();
//! let clock = FixedClock::new(instant);
//! assert_eq!(format_date(&clock.now()), "Mon, 02 Jan 2006 15:04:05 -0700");
//! ```

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local};

use crate::error::{Error, Result};

/// `strftime` layout of RFC 1123 with a numeric zone,
/// e.g. `Mon, 02 Jan 2006 15:04:05 -0700`.
pub const RFC1123Z: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Abstraction over wall-clock time.
///
/// In production, use [`SystemClock`]. In tests, use [`FixedClock`].
pub trait Clock: Send + Sync {
    /// Returns the current time with its UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

/// System clock reading local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<FixedOffset>,
}

impl FixedClock {
    /// Creates a clock that always reports `instant`.
    #[must_use]
    pub const fn new(instant: DateTime<FixedOffset>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.instant
    }
}

/// Formats a timestamp as an RFC 1123 date with numeric zone.
#[must_use]
pub fn format_date(instant: &DateTime<FixedOffset>) -> String {
    instant.format(RFC1123Z).to_string()
}

/// Parses a `Date` header value (RFC 5322 date-time).
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if the value does not parse.
pub fn parse_date(value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(value.trim()).map_err(|source| Error::InvalidDate {
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_date_numeric_zone() {
        let offset = FixedOffset::west_opt(7 * 3600).unwrap();
        let instant = offset.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap();
        assert_eq!(format_date(&instant), "Mon, 02 Jan 2006 15:04:05 -0700");

        let utc = FixedOffset::east_opt(0).unwrap();
        let instant = utc.with_ymd_and_hms(2023, 11, 1, 0, 0, 0).unwrap();
        assert_eq!(format_date(&instant), "Wed, 01 Nov 2023 00:00:00 +0000");
    }

    #[test]
    fn test_parse_date() {
        let parsed = parse_date(" Wed, 01 Nov 2023 00:00:00 +0000 ").unwrap();
        assert_eq!(parsed.timestamp(), 1_698_796_800);

        let parsed = parse_date("Mon, 02 Jan 2006 15:04:05 -0700").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), -7 * 3600);
    }

    #[test]
    fn test_parse_date_round_trips_format() {
        let now = SystemClock.now();
        let reparsed = parse_date(&format_date(&now)).unwrap();
        assert_eq!(reparsed.timestamp(), now.timestamp());
    }

    #[test]
    fn test_parse_date_invalid() {
        let err = parse_date("Inv, 99 Nov 9999 99:99:00 +0000").unwrap_err();
        assert!(matches!(err, Error::InvalidDate { ref value, .. } if value.starts_with("Inv")));

        assert!(parse_date("yesterday").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_fixed_clock() {
        let instant = parse_date("Mon, 02 Jan 2006 15:04:05 -0700").unwrap();
        let clock = Arc::new(FixedClock::new(instant));
        assert_eq!(clock.now(), instant);
        assert_eq!((&*clock).now(), instant);
    }
}
