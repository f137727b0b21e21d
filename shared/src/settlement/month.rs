use crate::error::{Result, SharedError};
use crate::models::settlement::{ResolvedWeek, WeekSelection};

use super::rules::RuleTable;
use super::week::{calculate_week_range, days_of_month, first_day_of_month, settlement_dates};

/// Number of settlement weeks in a month.
///
/// Counts the month's valid settlement dates, then extends the count by any
/// special weeks configured directly after the last natural week (the
/// December transition week, for instance).
pub fn weeks_in_month(rules: &RuleTable, year: i32, month: u32) -> Result<u32> {
    let first_day = first_day_of_month(year, month)
        .ok_or(SharedError::InvalidPeriod { year, month, week: 0 })?;
    let rule = rules.season_rule(year);

    let mut count = settlement_dates(rule, first_day).count() as u32;
    while rule
        .special_week(&WeekSelection::new(year, month, count + 1))
        .is_some()
    {
        count += 1;
    }
    Ok(count)
}

/// Full-month range: start of week 1 through the end of the last week.
///
/// Falls back to the plain calendar month when the month has no weeks.
pub fn month_date_range(rules: &RuleTable, year: i32, month: u32) -> Result<ResolvedWeek> {
    let count = weeks_in_month(rules, year, month)?;
    if count == 0 {
        let first_day = first_day_of_month(year, month)
            .ok_or(SharedError::InvalidPeriod { year, month, week: 0 })?;
        let last_day = days_of_month(first_day).last().unwrap_or(first_day);
        return Ok(ResolvedWeek {
            start_date: first_day,
            end_date: last_day,
        });
    }

    let first = calculate_week_range(rules, year, month, 1)?;
    let last = calculate_week_range(rules, year, month, count)?;
    Ok(ResolvedWeek {
        start_date: first.start_date,
        end_date: last.end_date,
    })
}

/// Every week of the month, in week-index order.
pub fn month_weeks(rules: &RuleTable, year: i32, month: u32) -> Result<Vec<ResolvedWeek>> {
    let count = weeks_in_month(rules, year, month)?;
    (1..=count)
        .map(|week| calculate_week_range(rules, year, month, week))
        .collect()
}
