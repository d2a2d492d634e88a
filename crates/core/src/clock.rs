//! Campaign day arithmetic.
//!
//! Day numbers are 1-based: day 1 is the start date itself. Elapsed time is
//! taken as a raw millisecond difference between two ambient-clock values
//! and floored into whole days; the campaign's configured timezone is only
//! used for scheduling the daily trigger, never for the day boundary. That
//! asymmetry is intentional and matches the deployed behavior.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const MS_PER_DAY: i64 = 86_400_000;

/// Campaign day number at `now` for a campaign anchored at `start_date`.
///
/// `floor((now - midnight of start_date) / 1 day) + 1`. Values below 1 mean
/// the campaign has not started yet; values above the campaign length mean
/// it is over. Neither is an error.
pub fn current_day(start_date: NaiveDate, now: NaiveDateTime) -> i64 {
    let start = start_date.and_time(NaiveTime::MIN);
    let elapsed_ms = (now - start).num_milliseconds();
    elapsed_ms.div_euclid(MS_PER_DAY) + 1
}

/// Whether `now` falls inside the eligibility window `[1, total_days]`.
pub fn is_eligible(start_date: NaiveDate, total_days: u32, now: NaiveDateTime) -> bool {
    let day = current_day(start_date, now);
    day >= 1 && day <= i64::from(total_days)
}

/// Days left in the window at `now`. Negative once the campaign is over.
pub fn days_remaining(start_date: NaiveDate, total_days: u32, now: NaiveDateTime) -> i64 {
    i64::from(total_days) - current_day(start_date, now)
}
