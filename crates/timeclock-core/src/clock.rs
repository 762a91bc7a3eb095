//! Time source abstraction.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime, Offset, Utc};

/// Source of the current instant and the local calendar.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Offset used to decide which calendar day an instant belongs to.
    fn offset(&self) -> FixedOffset;

    /// Current local calendar date.
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.offset()).date_naive()
    }
}

/// Wall clock of the host, with calendar days in the host's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        *Local::now().offset()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Create a clock stopped at `now`, with UTC calendar days.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    /// Create a clock stopped at `now` with calendar days in `offset`.
    #[must_use]
    pub const fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Mutex::new(now),
            offset,
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

/// UTC bounds `[start, end)` of calendar day `date` in `offset`.
#[must_use]
pub fn day_window(date: NaiveDate, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_midnight = date.and_time(NaiveTime::MIN);
    let start = (local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc();
    (start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_day_window_utc() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let (start, end) = day_window(date, FixedOffset::east_opt(0).unwrap());

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 5, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_day_window_east_of_utc() {
        // Copenhagen in winter: local midnight is 23:00 UTC the day before.
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let (start, end) = day_window(date, FixedOffset::east_opt(3600).unwrap());

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 14, 23, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 15, 23, 0, 0).unwrap());
    }

    #[test]
    fn test_today_follows_offset() {
        let clock = ManualClock::with_offset(
            Utc.with_ymd_and_hms(2025, 1, 14, 23, 30, 0).unwrap(),
            FixedOffset::east_opt(3600).unwrap(),
        );
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn test_manual_clock_advance() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 4, 8, 0, 0).unwrap();
        let clock = ManualClock::new(t0);

        clock.advance(Duration::hours(8));
        assert_eq!(clock.now(), t0 + Duration::hours(8));

        clock.set(t0);
        assert_eq!(clock.now(), t0);
    }
}
