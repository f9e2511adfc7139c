//! Working-window generation.
//!
//! For a date range, produces one working window per qualifying calendar
//! day (weekends optionally excluded), clipped to the range start on the
//! first day and rounded up to the slot quantum so no slot is offered in
//! the past or at an awkward start time.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Timelike, Weekday};
use chrono_tz::Tz;

use crate::error::{CoreError, CoreResult};

/// Candidate slot starts are aligned to this boundary.
pub const SLOT_QUANTUM_MINUTES: u32 = 15;

/// Working-hours configuration for slot finding.
///
/// Constructed once from configuration and overridden per query. The hour
/// invariant (`end_hour > start_hour`, both `0..=23`) is enforced here, at
/// construction, so the window generator never has to re-check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingWindowConfig {
    start_hour: u32,
    end_hour: u32,
    /// Skip Saturdays and Sundays entirely.
    pub exclude_weekends: bool,
    /// The canonical timezone all window arithmetic happens in.
    pub timezone: Tz,
}

impl Default for WorkingWindowConfig {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
            exclude_weekends: true,
            timezone: chrono_tz::Europe::Berlin,
        }
    }
}

impl WorkingWindowConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::HourOutOfRange`] if either hour exceeds 23 and
    /// [`CoreError::InvalidWorkingHours`] if the window is not forward.
    pub fn new(
        start_hour: u32,
        end_hour: u32,
        exclude_weekends: bool,
        timezone: Tz,
    ) -> CoreResult<Self> {
        if start_hour > 23 {
            return Err(CoreError::HourOutOfRange(start_hour));
        }
        if end_hour > 23 {
            return Err(CoreError::HourOutOfRange(end_hour));
        }
        if end_hour <= start_hour {
            return Err(CoreError::InvalidWorkingHours {
                start_hour,
                end_hour,
            });
        }
        Ok(Self {
            start_hour,
            end_hour,
            exclude_weekends,
            timezone,
        })
    }

    /// Returns the start of the working day (local hour).
    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    /// Returns the end of the working day (local hour).
    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    /// Returns a copy with per-query overrides applied, revalidated.
    ///
    /// `None` keeps the configured value. The combination is validated as
    /// a whole: overriding only `end_hour` below the configured start hour
    /// is rejected like any other invalid pair.
    pub fn overridden(
        &self,
        start_hour: Option<u32>,
        end_hour: Option<u32>,
        exclude_weekends: Option<bool>,
    ) -> CoreResult<Self> {
        Self::new(
            start_hour.unwrap_or(self.start_hour),
            end_hour.unwrap_or(self.end_hour),
            exclude_weekends.unwrap_or(self.exclude_weekends),
            self.timezone,
        )
    }
}

/// Parses an IANA timezone name.
pub fn parse_timezone(name: &str) -> CoreResult<Tz> {
    Tz::from_str(name).map_err(|_| CoreError::UnknownTimezone(name.to_string()))
}

/// One day's schedulable window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    /// The calendar date the window belongs to.
    pub date: NaiveDate,
    /// Start of the window (inclusive).
    pub start: DateTime<Tz>,
    /// End of the window (exclusive).
    pub end: DateTime<Tz>,
}

/// Lazy iterator over the working windows of a date range.
///
/// One [`DayWindow`] per qualifying date from `range_start.date()` through
/// `range_end.date()` inclusive. The sequence is finite and restartable:
/// cloning (or rebuilding from the same inputs) yields a fresh iteration.
#[derive(Debug, Clone)]
pub struct WorkingWindows {
    next_date: NaiveDate,
    last_date: NaiveDate,
    range_start: DateTime<Tz>,
    config: WorkingWindowConfig,
    done: bool,
}

impl WorkingWindows {
    /// Creates the window sequence for `[range_start, range_end]`.
    pub fn new(
        range_start: DateTime<Tz>,
        range_end: DateTime<Tz>,
        config: &WorkingWindowConfig,
    ) -> Self {
        let start_local = range_start.with_timezone(&config.timezone);
        let end_local = range_end.with_timezone(&config.timezone);
        Self {
            next_date: start_local.date_naive(),
            last_date: end_local.date_naive(),
            range_start: start_local,
            config: config.clone(),
            done: false,
        }
    }
}

impl Iterator for WorkingWindows {
    type Item = DayWindow;

    fn next(&mut self) -> Option<DayWindow> {
        loop {
            if self.done || self.next_date > self.last_date {
                return None;
            }
            let date = self.next_date;
            match date.succ_opt() {
                Some(d) => self.next_date = d,
                None => self.done = true,
            }

            if self.config.exclude_weekends
                && matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
            {
                continue;
            }

            let Some(mut start) = local_at_hour(date, self.config.start_hour(), self.config.timezone)
            else {
                continue;
            };
            let Some(end) = local_at_hour(date, self.config.end_hour(), self.config.timezone)
            else {
                continue;
            };

            if date == self.range_start.date_naive() {
                let clipped = if self.range_start > start {
                    self.range_start
                } else {
                    start
                };
                start = round_up_to_quantum(clipped);
            }

            if start >= end {
                continue;
            }
            return Some(DayWindow { date, start, end });
        }
    }
}

/// Rounds an instant UP to the next quantum boundary in local wall time.
///
/// Exactly-on-boundary instants are unchanged. The result never lands more
/// than one quantum ahead of the input: 09:07 becomes 09:15, 09:47 becomes
/// 10:00 (not 11:00).
pub fn round_up_to_quantum(t: DateTime<Tz>) -> DateTime<Tz> {
    let quantum_secs = SLOT_QUANTUM_MINUTES * 60;
    let naive = t.naive_local();
    let secs = naive.num_seconds_from_midnight();
    let rem = secs % quantum_secs;
    if rem == 0 && naive.nanosecond() == 0 {
        return t;
    }

    let rounded_secs = secs - rem + quantum_secs;
    let rounded = if rounded_secs >= 86_400 {
        naive
            .date()
            .succ_opt()
            .map(|d| d.and_time(NaiveTime::MIN))
    } else {
        NaiveTime::from_num_seconds_from_midnight_opt(rounded_secs, 0)
            .map(|tm| naive.date().and_time(tm))
    };

    // A boundary inside a DST gap has no local representation; keep the
    // clipped input in that case rather than failing the whole day.
    rounded
        .and_then(|n| t.timezone().from_local_datetime(&n).earliest())
        .unwrap_or(t)
}

/// Computes the query range for a `--weeks` style request.
///
/// The range runs from `now` to the Sunday ending the current week plus
/// `weeks - 1` further weeks, at 23:59:59 local time. `weeks` below 1 is
/// treated as 1.
pub fn range_for_weeks(now: DateTime<Tz>, weeks: u32) -> (DateTime<Tz>, DateTime<Tz>) {
    let weeks = weeks.max(1);
    let days_until_sunday = 6 - now.weekday().num_days_from_monday();
    let extra_days = u64::from(days_until_sunday) + 7 * (u64::from(weeks) - 1);
    let end_date = now.date_naive() + Days::new(extra_days);
    let end_naive = end_date.and_hms_opt(23, 59, 59).expect("valid time");
    let tz = now.timezone();
    // 23:59:59 can land in a DST gap only in zones that switch around
    // midnight; fall back to reading the wall time as UTC there.
    let end = tz
        .from_local_datetime(&end_naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&end_naive));
    (now, end)
}

fn local_at_hour(date: NaiveDate, hour: u32, tz: Tz) -> Option<DateTime<Tz>> {
    let naive = date.and_hms_opt(hour, 0, 0)?;
    tz.from_local_datetime(&naive).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Berlin;

    fn berlin(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Berlin.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod config {
        use super::*;

        #[test]
        fn default_is_nine_to_five_berlin() {
            let config = WorkingWindowConfig::default();
            assert_eq!(config.start_hour(), 9);
            assert_eq!(config.end_hour(), 17);
            assert!(config.exclude_weekends);
            assert_eq!(config.timezone, Berlin);
        }

        #[test]
        fn rejects_backward_hours() {
            let err = WorkingWindowConfig::new(17, 9, true, Berlin).unwrap_err();
            assert_eq!(
                err,
                CoreError::InvalidWorkingHours {
                    start_hour: 17,
                    end_hour: 9
                }
            );
        }

        #[test]
        fn rejects_equal_hours() {
            assert!(WorkingWindowConfig::new(9, 9, true, Berlin).is_err());
        }

        #[test]
        fn rejects_out_of_range_hours() {
            assert_eq!(
                WorkingWindowConfig::new(24, 25, true, Berlin).unwrap_err(),
                CoreError::HourOutOfRange(24)
            );
            assert_eq!(
                WorkingWindowConfig::new(9, 25, true, Berlin).unwrap_err(),
                CoreError::HourOutOfRange(25)
            );
        }

        #[test]
        fn overrides_are_revalidated() {
            let config = WorkingWindowConfig::default();
            let tweaked = config.overridden(Some(8), Some(18), Some(false)).unwrap();
            assert_eq!(tweaked.start_hour(), 8);
            assert_eq!(tweaked.end_hour(), 18);
            assert!(!tweaked.exclude_weekends);

            assert!(config.overridden(None, Some(9), None).is_err());
            assert!(config.overridden(Some(18), None, None).is_err());
        }

        #[test]
        fn timezone_parsing() {
            assert_eq!(parse_timezone("Europe/Berlin").unwrap(), Berlin);
            assert_eq!(
                parse_timezone("Nowhere/Special").unwrap_err(),
                CoreError::UnknownTimezone("Nowhere/Special".into())
            );
        }
    }

    mod quantum {
        use super::*;

        #[test]
        fn rounds_up_to_next_boundary() {
            assert_eq!(
                round_up_to_quantum(berlin(2025, 3, 3, 9, 7)),
                berlin(2025, 3, 3, 9, 15)
            );
            assert_eq!(
                round_up_to_quantum(berlin(2025, 3, 3, 9, 16)),
                berlin(2025, 3, 3, 9, 30)
            );
        }

        #[test]
        fn on_boundary_is_unchanged() {
            for minute in [0, 15, 30, 45] {
                let t = berlin(2025, 3, 3, 9, minute);
                assert_eq!(round_up_to_quantum(t), t);
            }
        }

        #[test]
        fn never_skips_more_than_one_quantum() {
            // The legacy rule added a whole hour for minutes 45-59; the
            // unambiguous restatement rounds 09:47 to 10:00.
            assert_eq!(
                round_up_to_quantum(berlin(2025, 3, 3, 9, 47)),
                berlin(2025, 3, 3, 10, 0)
            );
            assert_eq!(
                round_up_to_quantum(berlin(2025, 3, 3, 9, 59)),
                berlin(2025, 3, 3, 10, 0)
            );
        }

        #[test]
        fn sub_minute_precision_rounds_up() {
            let t = Berlin.with_ymd_and_hms(2025, 3, 3, 9, 15, 1).unwrap();
            assert_eq!(round_up_to_quantum(t), berlin(2025, 3, 3, 9, 30));
        }

        #[test]
        fn end_of_day_rolls_over() {
            let t = Berlin.with_ymd_and_hms(2025, 3, 3, 23, 50, 0).unwrap();
            assert_eq!(round_up_to_quantum(t), berlin(2025, 3, 4, 0, 0));
        }
    }

    mod windows {
        use super::*;

        // 2025-03-03 is a Monday.

        #[test]
        fn one_window_per_weekday() {
            let config = WorkingWindowConfig::default();
            let windows: Vec<_> = WorkingWindows::new(
                berlin(2025, 3, 3, 8, 0),
                berlin(2025, 3, 5, 23, 0),
                &config,
            )
            .collect();

            assert_eq!(windows.len(), 3);
            assert_eq!(windows[0].date, date(2025, 3, 3));
            assert_eq!(windows[0].start, berlin(2025, 3, 3, 9, 0));
            assert_eq!(windows[0].end, berlin(2025, 3, 3, 17, 0));
            assert_eq!(windows[2].date, date(2025, 3, 5));
        }

        #[test]
        fn weekends_are_skipped() {
            // Friday 2025-03-07 through Monday 2025-03-10.
            let config = WorkingWindowConfig::default();
            let windows: Vec<_> = WorkingWindows::new(
                berlin(2025, 3, 7, 8, 0),
                berlin(2025, 3, 10, 23, 0),
                &config,
            )
            .collect();

            let dates: Vec<_> = windows.iter().map(|w| w.date).collect();
            assert_eq!(dates, vec![date(2025, 3, 7), date(2025, 3, 10)]);
        }

        #[test]
        fn weekends_included_when_configured() {
            let config = WorkingWindowConfig::new(9, 17, false, Berlin).unwrap();
            let windows: Vec<_> = WorkingWindows::new(
                berlin(2025, 3, 7, 8, 0),
                berlin(2025, 3, 10, 23, 0),
                &config,
            )
            .collect();
            assert_eq!(windows.len(), 4);
        }

        #[test]
        fn first_day_is_clipped_and_rounded() {
            let config = WorkingWindowConfig::default();
            let windows: Vec<_> = WorkingWindows::new(
                berlin(2025, 3, 3, 9, 7),
                berlin(2025, 3, 3, 23, 0),
                &config,
            )
            .collect();

            assert_eq!(windows.len(), 1);
            assert_eq!(windows[0].start, berlin(2025, 3, 3, 9, 15));
            assert_eq!(windows[0].end, berlin(2025, 3, 3, 17, 0));
        }

        #[test]
        fn first_day_before_working_hours_starts_on_the_hour() {
            let config = WorkingWindowConfig::default();
            let windows: Vec<_> = WorkingWindows::new(
                berlin(2025, 3, 3, 6, 30),
                berlin(2025, 3, 3, 23, 0),
                &config,
            )
            .collect();
            assert_eq!(windows[0].start, berlin(2025, 3, 3, 9, 0));
        }

        #[test]
        fn first_day_past_window_end_contributes_nothing() {
            let config = WorkingWindowConfig::default();
            let windows: Vec<_> = WorkingWindows::new(
                berlin(2025, 3, 3, 17, 30),
                berlin(2025, 3, 4, 23, 0),
                &config,
            )
            .collect();

            assert_eq!(windows.len(), 1);
            assert_eq!(windows[0].date, date(2025, 3, 4));
        }

        #[test]
        fn rounding_to_window_end_contributes_nothing() {
            let config = WorkingWindowConfig::default();
            let windows: Vec<_> = WorkingWindows::new(
                berlin(2025, 3, 3, 16, 50),
                berlin(2025, 3, 3, 23, 59),
                &config,
            )
            .collect();
            assert!(windows.is_empty());
        }

        #[test]
        fn iteration_is_restartable() {
            let config = WorkingWindowConfig::default();
            let windows =
                WorkingWindows::new(berlin(2025, 3, 3, 8, 0), berlin(2025, 3, 7, 23, 0), &config);
            let first: Vec<_> = windows.clone().collect();
            let second: Vec<_> = windows.collect();
            assert_eq!(first, second);
            assert_eq!(first.len(), 5);
        }

        #[test]
        fn dst_transition_day_keeps_local_hours() {
            // Berlin springs forward on Sunday 2025-03-30.
            let config = WorkingWindowConfig::new(9, 17, false, Berlin).unwrap();
            let windows: Vec<_> = WorkingWindows::new(
                berlin(2025, 3, 30, 0, 30),
                berlin(2025, 3, 30, 23, 0),
                &config,
            )
            .collect();

            assert_eq!(windows.len(), 1);
            assert_eq!(windows[0].start, berlin(2025, 3, 30, 9, 0));
            assert_eq!(windows[0].end, berlin(2025, 3, 30, 17, 0));
        }
    }

    mod weeks {
        use super::*;

        #[test]
        fn one_week_ends_on_sunday_night() {
            // Wednesday 2025-03-05.
            let now = berlin(2025, 3, 5, 10, 0);
            let (start, end) = range_for_weeks(now, 1);
            assert_eq!(start, now);
            assert_eq!(end.date_naive(), date(2025, 3, 9)); // Sunday
            assert_eq!(end.time(), NaiveTime::from_hms_opt(23, 59, 59).unwrap());
        }

        #[test]
        fn additional_weeks_extend_by_seven_days() {
            let now = berlin(2025, 3, 5, 10, 0);
            let (_, one) = range_for_weeks(now, 1);
            let (_, three) = range_for_weeks(now, 3);
            assert_eq!(three.date_naive(), one.date_naive() + Days::new(14));
        }

        #[test]
        fn sunday_now_ends_same_day() {
            let now = berlin(2025, 3, 9, 10, 0);
            let (_, end) = range_for_weeks(now, 1);
            assert_eq!(end.date_naive(), date(2025, 3, 9));
        }

        #[test]
        fn zero_weeks_is_treated_as_one() {
            let now = berlin(2025, 3, 5, 10, 0);
            assert_eq!(range_for_weeks(now, 0), range_for_weeks(now, 1));
        }
    }
}
