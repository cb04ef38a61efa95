//! First hours covered by the averages ending at a given hour.

use chrono::{DateTime, Utc};
use maline_types::Bar;

use crate::{LONG_PERIOD, SHORT_PERIOD};

/// The bars each moving average spans when it ends at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaStartDates {
    /// The bar both averages end at.
    pub end: DateTime<Utc>,
    /// First bar included in the short average.
    pub ma30_start: DateTime<Utc>,
    /// First bar included in the long average.
    pub ma60_start: DateTime<Utc>,
}

/// Returns the first bar of each average ending at `end`.
///
/// With hourly bars, the short average covers `end - 29h ..= end` and the
/// long one `end - 59h ..= end`.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use maline_aggregate::ma_start_dates;
/// use maline_types::Bar;
///
/// let end = Utc.with_ymd_and_hms(2025, 1, 28, 15, 0, 0).unwrap();
/// let starts = ma_start_dates(end, Bar::Hour1);
/// assert_eq!(starts.ma30_start, Utc.with_ymd_and_hms(2025, 1, 27, 10, 0, 0).unwrap());
/// assert_eq!(starts.ma60_start, Utc.with_ymd_and_hms(2025, 1, 26, 4, 0, 0).unwrap());
/// ```
#[must_use]
pub fn ma_start_dates(end: DateTime<Utc>, bar: Bar) -> MaStartDates {
    let back = |period: usize| end - bar.duration() * (period as i32 - 1);
    MaStartDates {
        end,
        ma30_start: back(SHORT_PERIOD),
        ma60_start: back(LONG_PERIOD),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    #[test]
    fn test_hourly_starts() {
        let end = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let starts = ma_start_dates(end, Bar::Hour1);

        assert_eq!(starts.end, end);
        assert_eq!(end - starts.ma30_start, TimeDelta::hours(29));
        assert_eq!(end - starts.ma60_start, TimeDelta::hours(59));
        // Crosses the month boundary.
        assert_eq!(
            starts.ma30_start,
            Utc.with_ymd_and_hms(2025, 2, 27, 19, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_starts_scale_with_bar() {
        let end = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        let starts = ma_start_dates(end, Bar::Hour4);
        assert_eq!(end - starts.ma30_start, TimeDelta::hours(4 * 29));
        assert_eq!(end - starts.ma60_start, TimeDelta::hours(4 * 59));
    }
}
