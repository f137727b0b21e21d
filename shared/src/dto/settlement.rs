use crate::error::{Result, SharedError};
use crate::models::settlement::{weekday_from_sunday_index, ResolvedWeek, SeasonRule, WeekSelection};
use crate::settlement::format::{format_query_range, format_week_range};
use crate::settlement::rules::RuleTable;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A configured special week as it appears in rule files and API responses.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct SpecialWeekDto {
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: u32,
    #[validate(range(min = 1, message = "Week index starts at 1"))]
    pub week: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Data Transfer Object for a season rule
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct SeasonRuleDto {
    pub year: i32,
    /// 0 = Sunday .. 6 = Saturday
    #[validate(range(max = 6, message = "Settlement day must be 0 (Sunday) to 6 (Saturday)"))]
    pub settlement_day: u32,
    #[validate(range(max = 28, message = "Duration must be at most 28 days"))]
    pub duration_days: u32,
    #[serde(default)]
    #[validate]
    pub special_weeks: Vec<SpecialWeekDto>,
    #[serde(default)]
    pub excluded_settlement_dates: Vec<NaiveDate>,
}

/// On-disk rule table format.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct RuleTableDto {
    /// Year whose rule applies before the earliest configured year.
    pub default_year: i32,
    #[validate]
    pub rules: Vec<SeasonRuleDto>,
}

impl From<&SeasonRule> for SeasonRuleDto {
    fn from(rule: &SeasonRule) -> Self {
        Self {
            year: rule.year,
            settlement_day: rule.settlement_day_index(),
            duration_days: rule.duration_days,
            special_weeks: rule
                .special_weeks
                .iter()
                .map(|(key, range)| SpecialWeekDto {
                    year: key.year,
                    month: key.month,
                    week: key.week,
                    start_date: range.start_date,
                    end_date: range.end_date,
                })
                .collect(),
            excluded_settlement_dates: rule.excluded_settlement_dates.iter().copied().collect(),
        }
    }
}

impl TryFrom<SeasonRuleDto> for SeasonRule {
    type Error = SharedError;

    fn try_from(dto: SeasonRuleDto) -> Result<Self> {
        dto.validate()?;
        let settlement_day = weekday_from_sunday_index(dto.settlement_day).ok_or_else(|| {
            SharedError::InvalidRule(format!("settlement day {} is not a weekday", dto.settlement_day))
        })?;

        let mut rule = SeasonRule::new(dto.year, settlement_day, dto.duration_days);
        for special in dto.special_weeks {
            let range = ResolvedWeek::new(special.start_date, special.end_date)?;
            rule = rule.with_special_week(
                WeekSelection::new(special.year, special.month, special.week),
                range,
            );
        }
        for date in dto.excluded_settlement_dates {
            rule = rule.with_excluded_date(date);
        }
        Ok(rule)
    }
}

impl From<&RuleTable> for RuleTableDto {
    fn from(table: &RuleTable) -> Self {
        Self {
            default_year: table.default_rule().year,
            rules: table.rules().map(SeasonRuleDto::from).collect(),
        }
    }
}

impl TryFrom<RuleTableDto> for RuleTable {
    type Error = SharedError;

    fn try_from(dto: RuleTableDto) -> Result<Self> {
        dto.validate()?;
        let rules = dto
            .rules
            .into_iter()
            .map(SeasonRule::try_from)
            .collect::<Result<Vec<_>>>()?;
        let default = rules
            .iter()
            .find(|rule| rule.year == dto.default_year)
            .cloned()
            .ok_or_else(|| {
                SharedError::InvalidRule(format!(
                    "default year {} has no configured rule",
                    dto.default_year
                ))
            })?;
        RuleTable::new(default, rules)
    }
}

/// Query for a single settlement week
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WeekQuery {
    #[validate(range(min = 1, max = 9999, message = "Year must be between 1 and 9999"))]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: u32,
    #[validate(range(min = 1, message = "Week index starts at 1"))]
    pub week: u32,
}

impl WeekQuery {
    pub fn selection(&self) -> WeekSelection {
        WeekSelection::new(self.year, self.month, self.week)
    }
}

/// Query for a whole settlement month
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MonthQuery {
    #[validate(range(min = 1, max = 9999, message = "Year must be between 1 and 9999"))]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: u32,
}

/// Query for the current week; `date` overrides today's business date.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CurrentQuery {
    #[validate(custom = "validate_query_date")]
    pub date: Option<NaiveDate>,
}

fn validate_query_date(date: &NaiveDate) -> std::result::Result<(), ValidationError> {
    if !(1..=9999).contains(&date.year()) {
        let mut err = ValidationError::new("range");
        err.message = Some("Year must be between 1 and 9999".into());
        return Err(err);
    }
    Ok(())
}

/// A resolved settlement week ready for display and for ranking queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekRangeDto {
    pub year: i32,
    pub month: u32,
    pub week: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<FixedOffset>>,
    /// `YYYY/MM/DD - YYYY/MM/DD`
    pub display: String,
    /// `YYYY-MM-DD - YYYY-MM-DD`
    pub query: String,
    pub in_progress: bool,
}

impl WeekRangeDto {
    pub fn new(selection: WeekSelection, week: &ResolvedWeek, tz: &Tz, today: NaiveDate) -> Self {
        let bounds = week.in_timezone(tz);
        Self {
            year: selection.year,
            month: selection.month,
            week: selection.week,
            start_date: week.start_date,
            end_date: week.end_date,
            starts_at: bounds.map(|(start, _)| start.fixed_offset()),
            ends_at: bounds.map(|(_, end)| end.fixed_offset()),
            display: format_week_range(week),
            query: format_query_range(week),
            in_progress: week.contains(today),
        }
    }
}

/// A settlement month with its weeks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthRangeDto {
    pub year: i32,
    pub month: u32,
    pub weeks_in_month: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub display: String,
    pub query: String,
    pub weeks: Vec<WeekRangeDto>,
}

impl MonthRangeDto {
    pub fn new(year: i32, month: u32, range: &ResolvedWeek, weeks: Vec<WeekRangeDto>) -> Self {
        Self {
            year,
            month,
            weeks_in_month: weeks.len() as u32,
            start_date: range.start_date,
            end_date: range.end_date,
            display: format_week_range(range),
            query: format_query_range(range),
            weeks,
        }
    }
}

/// Which week "today" belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentWeekDto {
    pub today: NaiveDate,
    /// The current week, or the latest completed one when today is uncovered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<WeekSelection>,
    pub in_settlement_week: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<WeekRangeDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::rules::bundled;
    use crate::timezone::business_timezone;
    use chrono::Weekday;
    use pretty_assertions::assert_eq;
    use test_log::test;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_rule_dto() -> SeasonRuleDto {
        SeasonRuleDto {
            year: 2026,
            settlement_day: 0,
            duration_days: 6,
            special_weeks: vec![],
            excluded_settlement_dates: vec![date(2026, 1, 4)],
        }
    }

    #[test]
    fn test_rule_dto_converts_weekday_index() {
        let rule = SeasonRule::try_from(create_test_rule_dto()).unwrap();
        assert_eq!(rule.settlement_day, Weekday::Sun);
        assert!(rule.is_excluded(&date(2026, 1, 4)));
        assert_eq!(SeasonRuleDto::from(&rule), create_test_rule_dto());
    }

    #[test]
    fn test_rule_dto_rejects_bad_weekday() {
        let mut dto = create_test_rule_dto();
        dto.settlement_day = 7;
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("settlement_day"));
        assert!(matches!(SeasonRule::try_from(dto), Err(SharedError::Validation(_))));
    }

    #[test]
    fn test_rule_dto_rejects_bad_special_week_month() {
        let mut dto = create_test_rule_dto();
        dto.special_weeks.push(SpecialWeekDto {
            year: 2026,
            month: 13,
            week: 1,
            start_date: date(2026, 12, 26),
            end_date: date(2026, 12, 31),
        });
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_rule_table_json_round_trip_matches_bundled() {
        let dto = RuleTableDto::from(bundled());
        assert_eq!(dto.default_year, 2025);
        let json = serde_json::to_string(&dto).unwrap();
        let parsed: RuleTableDto = serde_json::from_str(&json).unwrap();
        let table = RuleTable::try_from(parsed).unwrap();
        assert_eq!(&table, bundled());
    }

    #[test]
    fn test_rule_table_requires_default_year_rule() {
        let dto = RuleTableDto {
            default_year: 2024,
            rules: vec![create_test_rule_dto()],
        };
        let err = RuleTable::try_from(dto).unwrap_err();
        assert!(matches!(err, SharedError::InvalidRule(_)));
    }

    #[test]
    fn test_week_query_validation() {
        let query = WeekQuery { year: 2025, month: 12, week: 5 };
        assert!(query.validate().is_ok());
        assert_eq!(query.selection(), WeekSelection::new(2025, 12, 5));

        let bad_month = WeekQuery { year: 2025, month: 0, week: 1 };
        assert!(bad_month.validate().unwrap_err().field_errors().contains_key("month"));

        let bad_week = WeekQuery { year: 2025, month: 1, week: 0 };
        assert!(bad_week.validate().unwrap_err().field_errors().contains_key("week"));
    }

    #[test]
    fn test_current_query_date_validation() {
        assert!(CurrentQuery::default().validate().is_ok());

        let in_range = CurrentQuery { date: NaiveDate::from_ymd_opt(2026, 1, 12) };
        assert!(in_range.validate().is_ok());

        let too_early = CurrentQuery { date: Some(NaiveDate::MIN) };
        assert!(too_early.validate().unwrap_err().field_errors().contains_key("date"));

        let too_late = CurrentQuery { date: NaiveDate::from_ymd_opt(10000, 1, 1) };
        assert!(too_late.validate().is_err());
    }

    #[test]
    fn test_week_range_dto_fields() {
        let week = ResolvedWeek {
            start_date: date(2025, 11, 28),
            end_date: date(2025, 12, 4),
        };
        let dto = WeekRangeDto::new(
            WeekSelection::new(2025, 12, 1),
            &week,
            &business_timezone(),
            date(2025, 12, 1),
        );
        assert_eq!(dto.display, "2025/11/28 - 2025/12/04");
        assert_eq!(dto.query, "2025-11-28 - 2025-12-04");
        assert!(dto.in_progress);

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["starts_at"], "2025-11-28T00:00:00+08:00");
        assert_eq!(json["ends_at"], "2025-12-04T23:59:59.999+08:00");
        assert_eq!(json["start_date"], "2025-11-28");
    }

    #[test]
    fn test_month_range_dto_counts_weeks() {
        let range = ResolvedWeek {
            start_date: date(2026, 1, 5),
            end_date: date(2026, 1, 25),
        };
        let dto = MonthRangeDto::new(2026, 1, &range, vec![]);
        assert_eq!(dto.weeks_in_month, 0);
        assert_eq!(dto.query, "2026-01-05 - 2026-01-25");
    }
}
