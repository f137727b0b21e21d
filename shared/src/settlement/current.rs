//! Helpers that relate settlement weeks to "now".
//!
//! The engine itself is clock-free; callers pass the current instant or the
//! current business day explicitly.

use crate::models::settlement::{ResolvedWeek, WeekSelection};
use crate::timezone::local_date;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

use super::month::month_weeks;
use super::rules::RuleTable;

/// Whether `now` falls inside `week` on the business calendar of `tz`.
pub fn is_in_progress(week: &ResolvedWeek, now: DateTime<Utc>, tz: &Tz) -> bool {
    week.contains(local_date(now, tz))
}

/// Whether `week` has fully elapsed at `now`.
pub fn is_completed(week: &ResolvedWeek, now: DateTime<Utc>, tz: &Tz) -> bool {
    local_date(now, tz) > week.end_date
}

/// The nominal week whose range contains `today`, if any.
///
/// A week belongs to the month its settlement date falls in, so the month
/// after `today` is searched too. Days that no week covers yield `None`.
pub fn current_week(rules: &RuleTable, today: NaiveDate) -> Option<WeekSelection> {
    [-1, 0, 1]
        .into_iter()
        .map(|offset| shift_month(today.year(), today.month(), offset))
        .flat_map(|(year, month)| indexed_weeks(rules, year, month))
        .find(|(_, week)| week.contains(today))
        .map(|(selection, _)| selection)
}

/// The week a dashboard should preselect: the current week, or else the most
/// recent week that ended before `today`.
pub fn default_selection(rules: &RuleTable, today: NaiveDate) -> Option<WeekSelection> {
    current_week(rules, today).or_else(|| latest_completed_week(rules, today))
}

fn latest_completed_week(rules: &RuleTable, today: NaiveDate) -> Option<WeekSelection> {
    [0, -1, -2]
        .into_iter()
        .map(|offset| shift_month(today.year(), today.month(), offset))
        .flat_map(|(year, month)| indexed_weeks(rules, year, month).into_iter().rev())
        .find(|(_, week)| week.end_date < today)
        .map(|(selection, _)| selection)
}

fn indexed_weeks(rules: &RuleTable, year: i32, month: u32) -> Vec<(WeekSelection, ResolvedWeek)> {
    month_weeks(rules, year, month)
        .unwrap_or_default()
        .into_iter()
        .zip(1u32..)
        .map(|(week, index)| (WeekSelection::new(year, month, index), week))
        .collect()
}

/// Move `offset` months from (year, month), carrying into the year.
pub(crate) fn shift_month(year: i32, month: u32, offset: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + offset;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}
