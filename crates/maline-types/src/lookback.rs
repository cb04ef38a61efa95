//! Lookback window for history retrieval.

use chrono::{DateTime, TimeDelta, Utc};

use crate::{Bar, LookbackError};

/// Longest accepted lookback, in days.
pub const MAX_LOOKBACK_DAYS: i64 = 3650;

/// Historical span to retrieve, counted back from "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    span: TimeDelta,
}

impl LookbackWindow {
    /// Creates a window, validating that it is positive and at most
    /// [`MAX_LOOKBACK_DAYS`] long.
    ///
    /// # Errors
    ///
    /// Returns an error if `span` is zero, negative or too long.
    pub fn new(span: TimeDelta) -> Result<Self, LookbackError> {
        if span <= TimeDelta::zero() {
            return Err(LookbackError::NotPositive(span.num_hours()));
        }
        if span > TimeDelta::days(MAX_LOOKBACK_DAYS) {
            return Err(LookbackError::TooLong {
                days: span.num_days(),
                max: MAX_LOOKBACK_DAYS,
            });
        }
        Ok(Self { span })
    }

    /// Creates a window spanning whole days.
    ///
    /// # Errors
    ///
    /// Returns an error if `days` is zero or exceeds [`MAX_LOOKBACK_DAYS`].
    pub fn days(days: u32) -> Result<Self, LookbackError> {
        let days = i64::from(days);
        let span = TimeDelta::try_days(days).ok_or(LookbackError::TooLong {
            days,
            max: MAX_LOOKBACK_DAYS,
        })?;
        Self::new(span)
    }

    /// Returns the span of the window.
    #[must_use]
    pub const fn span(&self) -> TimeDelta {
        self.span
    }

    /// Returns the earliest instant covered by the window, clamped to the
    /// earliest representable time.
    #[must_use]
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.span)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Returns this window widened by `bars` extra bars.
    #[must_use]
    pub fn widened(&self, bar: Bar, bars: u32) -> Self {
        Self {
            span: self.span + bar.duration() * bars as i32,
        }
    }

    /// Returns the number of whole bars inside the window, rounded up.
    #[must_use]
    pub fn bar_count(&self, bar: Bar) -> u64 {
        let secs = self.span.num_seconds() as u64;
        let bar_secs = bar.seconds() as u64;
        secs.div_ceil(bar_secs)
    }

    /// Returns true if the bar closing at `timestamp` lies inside the window
    /// ending at `now`.
    ///
    /// A bar closing exactly at the window start covered the time before it,
    /// so the start is exclusive.
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>, timestamp: DateTime<Utc>) -> bool {
        timestamp > self.start(now) && timestamp <= now
    }
}

impl Default for LookbackWindow {
    fn default() -> Self {
        Self {
            span: TimeDelta::days(30),
        }
    }
}

impl std::fmt::Display for LookbackWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hours = self.span.num_hours();
        if hours % 24 == 0 {
            write!(f, "{}d", hours / 24)
        } else {
            write!(f, "{hours}h")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_rejects_non_positive() {
        assert!(LookbackWindow::new(TimeDelta::zero()).is_err());
        assert!(LookbackWindow::new(TimeDelta::hours(-3)).is_err());
        assert!(LookbackWindow::days(0).is_err());
    }

    #[test]
    fn test_rejects_too_long() {
        assert_eq!(
            LookbackWindow::days(u32::MAX),
            Err(LookbackError::TooLong {
                days: i64::from(u32::MAX),
                max: MAX_LOOKBACK_DAYS,
            })
        );
        assert!(LookbackWindow::new(TimeDelta::MAX).is_err());
        assert!(LookbackWindow::days(3650).is_ok());
        assert!(LookbackWindow::days(3651).is_err());
    }

    #[test]
    fn test_start_clamps_at_earliest_time() {
        let window = LookbackWindow::days(1).unwrap();
        let earliest = DateTime::<Utc>::MIN_UTC;
        assert_eq!(window.start(earliest), earliest);
        assert!(!window.contains(earliest, earliest));
    }

    #[test]
    fn test_start() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let window = LookbackWindow::days(31).unwrap();
        assert_eq!(
            window.start(now),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_bar_count() {
        let window = LookbackWindow::default();
        assert_eq!(window.bar_count(Bar::Hour1), 720);
        assert_eq!(window.bar_count(Bar::Hour4), 180);

        let odd = LookbackWindow::new(TimeDelta::minutes(90)).unwrap();
        assert_eq!(odd.bar_count(Bar::Hour1), 2);
    }

    #[test]
    fn test_widened() {
        let window = LookbackWindow::days(1).unwrap().widened(Bar::Hour1, 59);
        assert_eq!(window.span(), TimeDelta::hours(83));
        assert_eq!(window.to_string(), "83h");
    }

    #[test]
    fn test_contains() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
        let window = LookbackWindow::days(1).unwrap();
        assert!(window.contains(now, now));
        assert!(window.contains(now, now - TimeDelta::hours(23)));
        assert!(!window.contains(now, now - TimeDelta::hours(24)));
        assert!(!window.contains(now, now + TimeDelta::hours(1)));
    }
}
