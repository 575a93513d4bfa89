// File: gameplug-core/src/utils/dates.rs

use chrono::{Days, NaiveDate, Utc};

const DAY_FORMAT: &str = "%Y-%m-%d";

fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Today's UTC calendar date as "YYYY-MM-DD". Daily-login claims are keyed
/// on this string, not on elapsed time.
pub fn today_string() -> String {
    format_day(Utc::now().date_naive())
}

/// Yesterday's UTC calendar date; used for exact-adjacency streak checks.
pub fn yesterday_string() -> String {
    let today = Utc::now().date_naive();
    format_day(today.checked_sub_days(Days::new(1)).unwrap_or(today))
}
