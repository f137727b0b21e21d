use crate::error::{Result, SharedError};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A nominal settlement week as the dashboard addresses it: week `week` of
/// `month` in `year`. Months are 1-12 and week indices start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeekSelection {
    pub year: i32,
    pub month: u32,
    pub week: u32,
}

impl WeekSelection {
    pub fn new(year: i32, month: u32, week: u32) -> Self {
        Self { year, month, week }
    }
}

/// Special weeks are keyed by the nominal selection a caller asks for, not by
/// the dates they cover.
pub type SpecialWeekKey = WeekSelection;

/// A period the reporting views filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettlementPeriod {
    Week(WeekSelection),
    Month { year: i32, month: u32 },
}

/// A concrete settlement interval at day granularity.
///
/// Both ends are inclusive: the interval starts at 00:00:00.000 on
/// `start_date` and ends at 23:59:59.999 on `end_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedWeek {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ResolvedWeek {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        if start_date > end_date {
            return Err(SharedError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self { start_date, end_date })
    }

    /// Wall-clock start of the interval (00:00:00.000 on the start day).
    pub fn starts_at(&self) -> NaiveDateTime {
        self.start_date.and_time(NaiveTime::MIN)
    }

    /// Wall-clock end of the interval (23:59:59.999 on the end day).
    pub fn ends_at(&self) -> NaiveDateTime {
        self.end_date.and_time(NaiveTime::MIN - Duration::milliseconds(1))
    }

    /// The interval bounds as instants in `tz`, or `None` if either bound
    /// falls into a DST gap.
    pub fn in_timezone(&self, tz: &Tz) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
        let start = crate::timezone::localize(self.starts_at(), tz)?;
        let end = crate::timezone::localize(self.ends_at(), tz)?;
        Some((start, end))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Whole days between the start and end dates.
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

/// One calendar year's settlement convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonRule {
    pub year: i32,
    /// Weekday on which a settlement week ends.
    pub settlement_day: Weekday,
    /// Days subtracted from the settlement day to get the week's first day.
    pub duration_days: u32,
    pub special_weeks: BTreeMap<SpecialWeekKey, ResolvedWeek>,
    /// Dates on the settlement weekday that do not close a week.
    pub excluded_settlement_dates: BTreeSet<NaiveDate>,
}

impl SeasonRule {
    pub fn new(year: i32, settlement_day: Weekday, duration_days: u32) -> Self {
        Self {
            year,
            settlement_day,
            duration_days,
            special_weeks: BTreeMap::new(),
            excluded_settlement_dates: BTreeSet::new(),
        }
    }

    pub fn with_special_week(mut self, key: SpecialWeekKey, range: ResolvedWeek) -> Self {
        self.special_weeks.insert(key, range);
        self
    }

    pub fn with_excluded_date(mut self, date: NaiveDate) -> Self {
        self.excluded_settlement_dates.insert(date);
        self
    }

    /// Settlement weekday as 0=Sunday..6=Saturday.
    pub fn settlement_day_index(&self) -> u32 {
        self.settlement_day.num_days_from_sunday()
    }

    pub fn special_week(&self, key: &SpecialWeekKey) -> Option<&ResolvedWeek> {
        self.special_weeks.get(key)
    }

    pub fn is_excluded(&self, date: &NaiveDate) -> bool {
        self.excluded_settlement_dates.contains(date)
    }

    /// A date closes a settlement week when it falls on the settlement
    /// weekday and is not excluded.
    pub fn is_settlement_date(&self, date: &NaiveDate) -> bool {
        date.weekday() == self.settlement_day && !self.is_excluded(date)
    }
}

/// Map a 0=Sunday..6=Saturday index to a weekday.
pub fn weekday_from_sunday_index(index: u32) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}
