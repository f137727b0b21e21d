use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// IANA name of the timezone the league settles in.
pub const BUSINESS_TIMEZONE_NAME: &str = "Asia/Shanghai";

/// The league's business timezone (Beijing time).
pub fn business_timezone() -> Tz {
    chrono_tz::Asia::Shanghai
}

/// Parse a timezone name, returning `None` for unknown zones.
pub fn parse_timezone(timezone_name: &str) -> Option<Tz> {
    timezone_name.parse().ok()
}

/// Convert a UTC datetime to a specific timezone
pub fn convert_to_timezone(utc_dt: DateTime<Utc>, tz: &Tz) -> DateTime<Tz> {
    utc_dt.with_timezone(tz)
}

/// The calendar day a UTC instant falls on in the given timezone.
pub fn local_date(utc_dt: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    convert_to_timezone(utc_dt, tz).date_naive()
}

/// Attach a timezone to a wall-clock datetime.
///
/// Ambiguous local times (DST fold) resolve to the earlier instant; local times
/// that do not exist (DST gap) return `None`. Neither happens in Asia/Shanghai.
pub fn localize(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => None,
    }
}

/// Format a datetime with its timezone abbreviation
pub fn format_with_timezone(utc_dt: DateTime<Utc>, tz: &Tz) -> String {
    let local_dt = convert_to_timezone(utc_dt, tz);
    local_dt.format("%Y/%m/%d %H:%M (%Z)").to_string()
}
