use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::dates::{change_instant, days_between, parse_calendar_day};
use crate::domain::Aligner;

pub const MIN_DAYS_PER_ALIGNER: u32 = 1;
pub const MAX_DAYS_PER_ALIGNER: u32 = 30;
pub const MIN_TOTAL_ALIGNERS: u32 = 1;
pub const MAX_TOTAL_ALIGNERS: u32 = 100;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("days per aligner must be between 1 and 30, got {0}")]
    DaysPerAlignerOutOfRange(u32),
    #[error("total aligners must be between 1 and 100, got {0}")]
    TotalAlignersOutOfRange(u32),
    #[error("unparsable start date: {0:?}")]
    InvalidStartDate(String),
}

/// Build the full schedule: `total_aligners` trays, each spanning
/// `days_per_aligner` calendar days, back to back from `start_date`.
pub fn generate(
    start_date: NaiveDate,
    days_per_aligner: u32,
    total_aligners: u32,
) -> Result<Vec<Aligner>, ScheduleError> {
    if !(MIN_DAYS_PER_ALIGNER..=MAX_DAYS_PER_ALIGNER).contains(&days_per_aligner) {
        return Err(ScheduleError::DaysPerAlignerOutOfRange(days_per_aligner));
    }
    if !(MIN_TOTAL_ALIGNERS..=MAX_TOTAL_ALIGNERS).contains(&total_aligners) {
        return Err(ScheduleError::TotalAlignersOutOfRange(total_aligners));
    }

    let mut aligners = Vec::with_capacity(total_aligners as usize);
    let mut current_start = start_date;
    for number in 1..=total_aligners {
        let end_date = current_start + Duration::days(i64::from(days_per_aligner) - 1);
        aligners.push(Aligner {
            number,
            start_date: current_start,
            end_date,
            change_at: change_instant(end_date),
            completed: false,
        });
        current_start = end_date + Duration::days(1);
    }

    Ok(aligners)
}

/// Same as [`generate`], for setup input where the start date arrives as
/// a raw `YYYY-MM-DD` string.
pub fn generate_from_input(
    start_date: &str,
    days_per_aligner: u32,
    total_aligners: u32,
) -> Result<Vec<Aligner>, ScheduleError> {
    let start = parse_calendar_day(start_date)
        .map_err(|_| ScheduleError::InvalidStartDate(start_date.to_string()))?;
    generate(start, days_per_aligner, total_aligners)
}

/// The aligner whose inclusive date range contains `today`. A day before
/// the schedule maps to the first aligner and a day past it maps to the
/// last one; only an empty schedule has no current aligner.
pub fn current_aligner(schedule: &[Aligner], today: NaiveDate) -> Option<&Aligner> {
    if let Some(aligner) = schedule
        .iter()
        .find(|aligner| aligner.start_date <= today && today <= aligner.end_date)
    {
        return Some(aligner);
    }

    let first = schedule.first()?;
    if today < first.start_date {
        return Some(first);
    }

    schedule.last()
}

pub fn next_aligner(schedule: &[Aligner], current_number: u32) -> Option<&Aligner> {
    schedule
        .iter()
        .find(|aligner| aligner.number == current_number + 1)
}

/// Days until the aligner's last day, counted between local midnights and
/// clamped so a day already past reads 0.
pub fn days_remaining(aligner: &Aligner, today: NaiveDate) -> i64 {
    days_between(today, aligner.end_date).max(0)
}

/// Treatment progress as a whole percentage: how many aligners are fully
/// behind the current one.
pub fn progress(current_number: u32, total_aligners: u32) -> u8 {
    if total_aligners == 0 {
        return 0;
    }
    let completed = f64::from(current_number.saturating_sub(1));
    ((completed / f64::from(total_aligners)) * 100.0).round() as u8
}

pub fn completed_count(schedule: &[Aligner]) -> usize {
    schedule.iter().filter(|aligner| aligner.completed).count()
}

/// Re-derive the schedule after a manual end-date edit: the edited
/// aligner keeps its start and takes the new end, every later aligner is
/// shifted to stay contiguous at `days_per_aligner` days, and everything
/// before the edit is left untouched. `completed` flags survive.
pub fn recalculate_from(
    schedule: &[Aligner],
    edited_number: u32,
    new_end_date: NaiveDate,
    days_per_aligner: u32,
) -> Vec<Aligner> {
    let mut rebuilt = Vec::with_capacity(schedule.len());
    let mut next_start: Option<NaiveDate> = None;

    for aligner in schedule {
        if aligner.number == edited_number {
            rebuilt.push(Aligner {
                end_date: new_end_date,
                change_at: change_instant(new_end_date),
                ..aligner.clone()
            });
            next_start = Some(new_end_date + Duration::days(1));
        } else if let Some(start) = next_start {
            let end_date = start + Duration::days(i64::from(days_per_aligner) - 1);
            rebuilt.push(Aligner {
                number: aligner.number,
                start_date: start,
                end_date,
                change_at: change_instant(end_date),
                completed: aligner.completed,
            });
            next_start = Some(end_date + Duration::days(1));
        } else {
            rebuilt.push(aligner.clone());
        }
    }

    rebuilt
}
