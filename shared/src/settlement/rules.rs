//! Year-to-rule lookup for the settlement calendar.

use crate::dto::settlement::RuleTableDto;
use crate::error::{Result, SharedError};
use crate::models::settlement::{ResolvedWeek, SeasonRule, WeekSelection};
use chrono::{Datelike, NaiveDate, Weekday};
use log::warn;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use super::week::settlement_dates;

static BUNDLED_RULES: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::new(season_2025(), [season_2025(), season_2026()])
        .expect("bundled season rules are valid")
});

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("bundled season rule dates are valid")
}

/// 2025: weeks close on Thursday. The last week of December runs to the end
/// of the year so the 2026 convention can start cleanly.
fn season_2025() -> SeasonRule {
    SeasonRule::new(2025, Weekday::Thu, 6).with_special_week(
        WeekSelection::new(2025, 12, 5),
        ResolvedWeek {
            start_date: ymd(2025, 12, 26),
            end_date: ymd(2025, 12, 31),
        },
    )
}

/// 2026: weeks close on Sunday. Jan 4 would close a week that overlaps the
/// 2025 transition week, so it does not count.
fn season_2026() -> SeasonRule {
    SeasonRule::new(2026, Weekday::Sun, 6).with_excluded_date(ymd(2026, 1, 4))
}

/// Immutable year -> rule table.
///
/// Lookup is total: an explicit entry wins, years after the latest entry use
/// the latest rule, and everything else uses the default rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    default: SeasonRule,
    rules: BTreeMap<i32, SeasonRule>,
}

impl RuleTable {
    pub fn new(default: SeasonRule, rules: impl IntoIterator<Item = SeasonRule>) -> Result<Self> {
        validate_rule(&default)?;

        let mut by_year = BTreeMap::new();
        for rule in rules {
            validate_rule(&rule)?;
            let year = rule.year;
            if by_year.insert(year, rule).is_some() {
                return Err(SharedError::InvalidRule(format!(
                    "more than one rule for year {}",
                    year
                )));
            }
        }

        Ok(Self {
            default,
            rules: by_year,
        })
    }

    pub fn season_rule(&self, year: i32) -> &SeasonRule {
        if let Some(rule) = self.rules.get(&year) {
            return rule;
        }
        match self.rules.last_key_value() {
            Some((&latest, rule)) if year > latest => rule,
            _ => &self.default,
        }
    }

    /// Parse and validate a rule table in the [`RuleTableDto`] JSON format.
    pub fn from_json(json: &str) -> Result<Self> {
        let dto: RuleTableDto = serde_json::from_str(json)?;
        RuleTable::try_from(dto)
    }

    pub fn default_rule(&self) -> &SeasonRule {
        &self.default
    }

    /// Explicitly configured rules in ascending year order.
    pub fn rules(&self) -> impl Iterator<Item = &SeasonRule> {
        self.rules.values()
    }

    pub fn earliest_year(&self) -> Option<i32> {
        self.rules.keys().next().copied()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.rules.keys().next_back().copied()
    }
}

/// The rule table shipped with the crate.
pub fn bundled() -> &'static RuleTable {
    &BUNDLED_RULES
}

/// Rule for `year` from the bundled table.
pub fn season_rule(year: i32) -> &'static SeasonRule {
    BUNDLED_RULES.season_rule(year)
}

fn validate_rule(rule: &SeasonRule) -> Result<()> {
    for (key, range) in &rule.special_weeks {
        if key.year != rule.year {
            return Err(SharedError::InvalidRule(format!(
                "special week {}-{}-{} is registered on the {} rule",
                key.year, key.month, key.week, rule.year
            )));
        }
        if key.week == 0 {
            return Err(SharedError::InvalidRule(format!(
                "special week {}-{} has week index 0",
                key.year, key.month
            )));
        }
        if range.start_date > range.end_date {
            return Err(SharedError::InvalidDateRange {
                start: range.start_date,
                end: range.end_date,
            });
        }
        let first_day = NaiveDate::from_ymd_opt(key.year, key.month, 1).ok_or_else(|| {
            SharedError::InvalidRule(format!(
                "special week {}-{}-{} names an invalid month",
                key.year, key.month, key.week
            ))
        })?;

        // Extra weeks beyond the weekday count must be contiguous, otherwise
        // the month's week count would skip a resolvable index.
        let natural = settlement_dates(rule, first_day).count() as u32;
        for index in (natural + 1)..key.week {
            let gap = WeekSelection::new(key.year, key.month, index);
            if rule.special_week(&gap).is_none() {
                return Err(SharedError::InvalidRule(format!(
                    "special week {}-{}-{} leaves week {} undefined",
                    key.year, key.month, key.week, index
                )));
            }
        }
    }

    for date in &rule.excluded_settlement_dates {
        if date.weekday() != rule.settlement_day {
            warn!(
                "Excluded settlement date {} in the {} rule is a {:?}, not a {:?}; it has no effect",
                date, rule.year, date.weekday(), rule.settlement_day
            );
        }
    }

    Ok(())
}
