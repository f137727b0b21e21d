use anyhow::Context;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use log::info;
use shared::settlement::{
    bundled, calculate_week_range, current_week, default_selection, month_date_range, month_weeks,
    RuleTable,
};
use shared::timezone::{local_date, parse_timezone};
use shared::{CurrentWeekDto, MonthRangeDto, SeasonRuleDto, WeekRangeDto, WeekSelection};
use std::sync::Arc;

use crate::config::SettlementConfig;

/// The settlement calendar as the HTTP layer sees it: an immutable rule table
/// plus the timezone that defines "today".
#[derive(Debug, Clone)]
pub struct SettlementService {
    rules: Arc<RuleTable>,
    timezone: Tz,
}

impl SettlementService {
    pub fn new(rules: Arc<RuleTable>, timezone: Tz) -> Self {
        Self { rules, timezone }
    }

    pub fn from_config(config: &SettlementConfig) -> anyhow::Result<Self> {
        let timezone = parse_timezone(&config.timezone)
            .with_context(|| format!("unknown settlement timezone {}", config.timezone))?;

        let rules = match &config.rules_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading settlement rules from {}", path))?;
                let table = RuleTable::from_json(&json)
                    .with_context(|| format!("parsing settlement rules from {}", path))?;
                info!("Loaded {} settlement rules from {}", table.rules().count(), path);
                table
            }
            None => {
                info!("Using {} bundled settlement rules", bundled().rules().count());
                bundled().clone()
            }
        };

        Ok(Self::new(Arc::new(rules), timezone))
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Today's date on the business calendar.
    pub fn today(&self) -> NaiveDate {
        local_date(Utc::now(), &self.timezone)
    }

    pub fn season_rule(&self, year: i32) -> SeasonRuleDto {
        SeasonRuleDto::from(self.rules.season_rule(year))
    }

    pub fn week(&self, selection: WeekSelection, today: NaiveDate) -> shared::Result<WeekRangeDto> {
        let week = calculate_week_range(&self.rules, selection.year, selection.month, selection.week)?;
        Ok(WeekRangeDto::new(selection, &week, &self.timezone, today))
    }

    pub fn month(&self, year: i32, month: u32, today: NaiveDate) -> shared::Result<MonthRangeDto> {
        let range = month_date_range(&self.rules, year, month)?;
        let weeks = month_weeks(&self.rules, year, month)?
            .iter()
            .zip(1u32..)
            .map(|(week, index)| {
                WeekRangeDto::new(
                    WeekSelection::new(year, month, index),
                    week,
                    &self.timezone,
                    today,
                )
            })
            .collect();
        Ok(MonthRangeDto::new(year, month, &range, weeks))
    }

    pub fn current(&self, today: NaiveDate) -> CurrentWeekDto {
        let selection = default_selection(&self.rules, today);
        CurrentWeekDto {
            today,
            selection,
            in_settlement_week: current_week(&self.rules, today).is_some(),
            week: selection.and_then(|selection| self.week(selection, today).ok()),
        }
    }
}
