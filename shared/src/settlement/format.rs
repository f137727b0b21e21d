use crate::models::settlement::ResolvedWeek;
use std::fmt;

/// Date format used in reporting headers and filter labels.
pub const DISPLAY_DATE_FORMAT: &str = "%Y/%m/%d";
/// Date format the ranking API expects in range parameters.
pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

/// `YYYY/MM/DD - YYYY/MM/DD`
pub fn format_week_range(week: &ResolvedWeek) -> String {
    format!(
        "{} - {}",
        week.start_date.format(DISPLAY_DATE_FORMAT),
        week.end_date.format(DISPLAY_DATE_FORMAT)
    )
}

/// `YYYY-MM-DD - YYYY-MM-DD`, passed verbatim to date-ranged data sources.
pub fn format_query_range(week: &ResolvedWeek) -> String {
    format!(
        "{} - {}",
        week.start_date.format(QUERY_DATE_FORMAT),
        week.end_date.format(QUERY_DATE_FORMAT)
    )
}

impl fmt::Display for ResolvedWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_week_range(self))
    }
}
