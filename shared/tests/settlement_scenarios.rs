use chrono::{NaiveDate, Weekday};
use pretty_assertions::assert_eq;
use shared::settlement::{bundled, rules::RuleTable};
use shared::{
    calculate_week_range, format_query_range, format_week_range, month_date_range, season_rule,
    weeks_in_month, SharedError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn first_thursday_week_of_december_2025() {
    let week = calculate_week_range(bundled(), 2025, 12, 1).unwrap();
    assert_eq!(
        week.starts_at(),
        date(2025, 11, 28).and_hms_milli_opt(0, 0, 0, 0).unwrap()
    );
    assert_eq!(
        week.ends_at(),
        date(2025, 12, 4).and_hms_milli_opt(23, 59, 59, 999).unwrap()
    );
    assert_eq!(format_week_range(&week), "2025/11/28 - 2025/12/04");
}

#[test]
fn december_2025_transition_week_is_configured() {
    let week = calculate_week_range(bundled(), 2025, 12, 5).unwrap();
    assert_eq!(format_query_range(&week), "2025-12-26 - 2025-12-31");
    assert_eq!(weeks_in_month(bundled(), 2025, 12).unwrap(), 5);
}

#[test]
fn january_2026_skips_the_excluded_sunday() {
    let week = calculate_week_range(bundled(), 2026, 1, 1).unwrap();
    assert_eq!(week.start_date, date(2026, 1, 5));
    assert_eq!(week.end_date, date(2026, 1, 11));
}

#[test]
fn later_years_inherit_the_2026_rule() {
    assert_eq!(season_rule(2030), season_rule(2026));
    assert_eq!(season_rule(2030).settlement_day, Weekday::Sun);
}

#[test]
fn missing_fifth_week_is_reported() {
    let err = calculate_week_range(bundled(), 2026, 2, 5).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err, SharedError::WeekNotFound { year: 2026, month: 2, week: 5 });
}

#[test]
fn json_table_drives_the_same_engine() {
    let table = RuleTable::from_json(
        r#"{
            "default_year": 2025,
            "rules": [
                { "year": 2025, "settlement_day": 4, "duration_days": 6,
                  "special_weeks": [ { "year": 2025, "month": 12, "week": 5,
                                       "start_date": "2025-12-26", "end_date": "2025-12-31" } ] },
                { "year": 2026, "settlement_day": 0, "duration_days": 6,
                  "excluded_settlement_dates": ["2026-01-04"] },
                { "year": 2027, "settlement_day": 5, "duration_days": 6 }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(
        month_date_range(&table, 2025, 12).unwrap(),
        month_date_range(bundled(), 2025, 12).unwrap()
    );
    // 2027 closes on Fridays: January 1st 2027 is one
    let first = calculate_week_range(&table, 2027, 1, 1).unwrap();
    assert_eq!(first.start_date, date(2026, 12, 26));
    assert_eq!(first.end_date, date(2027, 1, 1));
}
