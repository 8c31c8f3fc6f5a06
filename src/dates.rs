use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

pub const CALENDAR_DAY_FORMAT: &str = "%Y-%m-%d";

// Change reminders fire at 07:00 local time on the aligner's last day.
pub const CHANGE_REMINDER_HOUR: u32 = 7;
pub const CHANGE_REMINDER_MINUTE: u32 = 0;

pub fn calendar_day(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

pub fn parse_calendar_day(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw, CALENDAR_DAY_FORMAT)
}

/// Fixed-width `YYYY-MM-DD`, so string order matches date order.
pub fn format_calendar_day(day: NaiveDate) -> String {
    day.format(CALENDAR_DAY_FORMAT).to_string()
}

pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Whole seconds between a stored checkpoint and `now`, never negative.
pub fn elapsed_seconds_since(checkpoint: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - checkpoint).num_seconds().max(0)
}

/// The instant the change reminder for an aligner ending on `day` fires:
/// 07:00 local on that day, nudged forward if that wall-clock time does
/// not exist (DST gap).
pub fn change_instant(day: NaiveDate) -> DateTime<Utc> {
    let naive = day
        .and_hms_opt(CHANGE_REMINDER_HOUR, CHANGE_REMINDER_MINUTE, 0)
        .expect("reminder time must be valid");
    local_naive_to_utc_resolved(naive)
}

fn local_naive_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(local_datetime) => Some(local_datetime.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, second) => Some(first.min(second).with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

fn local_naive_to_utc_resolved(naive: NaiveDateTime) -> DateTime<Utc> {
    if let Some(timestamp) = local_naive_to_utc(naive) {
        return timestamp;
    }

    let mut cursor = naive + Duration::minutes(1);
    for _ in 0..120 {
        if let Some(timestamp) = local_naive_to_utc(cursor) {
            return timestamp;
        }
        cursor += Duration::minutes(1);
    }

    panic!("local reminder time does not exist");
}
