//! Settlement-period calendar.
//!
//! Converts a (year, month, week) selection into a concrete date range under
//! the league's per-year settlement conventions. Everything here is pure: the
//! rule table is immutable and no function reads the clock.

pub mod current;
pub mod format;
pub mod month;
pub mod rules;
pub mod week;

pub use current::{current_week, default_selection, is_completed, is_in_progress};
pub use format::{format_query_range, format_week_range};
pub use month::{month_date_range, month_weeks, weeks_in_month};
pub use rules::{bundled, season_rule, RuleTable};
pub use week::calculate_week_range;

use crate::error::Result;
use crate::models::settlement::{ResolvedWeek, SettlementPeriod};

/// Resolve a week or whole-month period to its date range.
pub fn resolve_period(rules: &RuleTable, period: SettlementPeriod) -> Result<ResolvedWeek> {
    match period {
        SettlementPeriod::Week(selection) => {
            calculate_week_range(rules, selection.year, selection.month, selection.week)
        }
        SettlementPeriod::Month { year, month } => month_date_range(rules, year, month),
    }
}
