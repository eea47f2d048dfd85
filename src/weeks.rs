use time::{Date, Duration, Month, OffsetDateTime};

// Weeks start on Sunday, computed from the UTC date of the timestamp.
pub fn week_start(timestamp: i64) -> Option<Date> {
    let date = OffsetDateTime::from_unix_timestamp(timestamp).ok()?.date();
    let offset = i64::from(date.weekday().number_days_from_sunday());
    date.checked_sub(Duration::days(offset))
}

pub fn week_key(week: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        week.year(),
        u8::from(week.month()),
        week.day()
    )
}

pub fn parse_week_key(value: &str) -> Option<Date> {
    let mut parts = value.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

pub fn previous_week(week: Date) -> Option<Date> {
    week.checked_sub(Duration::weeks(1))
}

// True when `previous` is exactly one calendar week before `current`.
pub fn is_adjacent(previous: Date, current: Date) -> bool {
    previous_week(current) == Some(previous)
}
