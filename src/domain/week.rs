use super::enums::WeekStart;
use chrono::{Datelike, Duration, NaiveDate};

/// First day of the week containing `date`
pub fn week_start_date(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let offset = match week_start {
        WeekStart::Monday => date.weekday().num_days_from_monday(),
        WeekStart::Sunday => date.weekday().num_days_from_sunday(),
    };
    date - Duration::days(i64::from(offset))
}

/// The seven days of the week containing `date`
pub fn week_days(date: NaiveDate, week_start: WeekStart) -> [NaiveDate; 7] {
    let first = week_start_date(date, week_start);
    std::array::from_fn(|i| first + Duration::days(i as i64))
}

/// Column header like "Mon 13"
pub fn day_label(date: NaiveDate) -> String {
    date.format("%a %d").to_string()
}

/// Board title like "Jan 12 - Jan 18, 2025"
pub fn week_label(date: NaiveDate, week_start: WeekStart) -> String {
    let days = week_days(date, week_start);
    format!(
        "{} - {}",
        days[0].format("%b %d"),
        days[6].format("%b %d, %Y")
    )
}

/// Parse a user supplied day: YYYY-MM-DD, "today" or "tomorrow"
pub fn parse_day(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    match input.trim().to_lowercase().as_str() {
        "today" => Some(today),
        "tomorrow" => Some(today + Duration::days(1)),
        "yesterday" => Some(today - Duration::days(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").ok(),
    }
}

/// Parse a day, or a word meaning "no date" (back to the backlog)
pub fn parse_schedule(input: &str, today: NaiveDate) -> Option<Option<NaiveDate>> {
    match input.trim().to_lowercase().as_str() {
        "" | "none" | "someday" | "backlog" => Some(None),
        other => parse_day(other, today).map(Some),
    }
}
