pub mod models {
    pub mod settlement;
}

pub mod dto {
    pub mod settlement;
}

pub mod error;
pub mod settlement;
pub mod timezone;

// Re-export commonly used items
pub use error::{Result, SharedError};

pub use models::settlement::{
    ResolvedWeek, SeasonRule, SettlementPeriod, SpecialWeekKey, WeekSelection,
};

pub use dto::settlement::{
    CurrentQuery, CurrentWeekDto, MonthQuery, MonthRangeDto, RuleTableDto, SeasonRuleDto,
    SpecialWeekDto, WeekQuery, WeekRangeDto,
};

pub use settlement::{
    calculate_week_range, current_week, default_selection, format_query_range,
    format_week_range, month_date_range, month_weeks, resolve_period, season_rule,
    weeks_in_month, RuleTable,
};
