use crate::error::{Result, SharedError};
use crate::models::settlement::{ResolvedWeek, SeasonRule, WeekSelection};
use chrono::{Datelike, Days, NaiveDate};
use log::debug;

use super::rules::RuleTable;

/// Resolve week `week` of `month` in `year` to its date range.
///
/// A configured special week for the exact (year, month, week) wins over
/// weekday arithmetic. Otherwise the week ends on the `week`-th settlement
/// date of the month, skipping excluded dates, and starts `duration_days`
/// earlier. Asking for more weeks than the month has yields
/// [`SharedError::WeekNotFound`]; a start date before the representable
/// calendar yields [`SharedError::InvalidPeriod`].
pub fn calculate_week_range(
    rules: &RuleTable,
    year: i32,
    month: u32,
    week: u32,
) -> Result<ResolvedWeek> {
    let first_day = first_day_of_month(year, month)
        .filter(|_| week >= 1)
        .ok_or(SharedError::InvalidPeriod { year, month, week })?;

    let rule = rules.season_rule(year);
    let key = WeekSelection::new(year, month, week);
    if let Some(special) = rule.special_week(&key) {
        debug!(
            "Using configured special week for {}-{}-{}: {} to {}",
            year, month, week, special.start_date, special.end_date
        );
        return Ok(*special);
    }

    let end_date = settlement_dates(rule, first_day)
        .nth((week - 1) as usize)
        .ok_or(SharedError::WeekNotFound { year, month, week })?;

    let start_date = end_date
        .checked_sub_days(Days::new(u64::from(rule.duration_days)))
        .ok_or(SharedError::InvalidPeriod { year, month, week })?;

    Ok(ResolvedWeek { start_date, end_date })
}

pub(crate) fn first_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Every day of the month that `first_day` opens.
pub(crate) fn days_of_month(first_day: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let month = first_day.month();
    first_day
        .iter_days()
        .take(31)
        .take_while(move |day| day.month() == month)
}

/// Valid settlement dates of the month that `first_day` opens, in order.
pub(crate) fn settlement_dates(
    rule: &SeasonRule,
    first_day: NaiveDate,
) -> impl Iterator<Item = NaiveDate> + '_ {
    days_of_month(first_day)
        .filter(move |day| day.weekday() == rule.settlement_day)
        .filter(move |day| {
            if rule.is_excluded(day) {
                debug!("Skipping excluded settlement date {}", day);
                false
            } else {
                true
            }
        })
}
