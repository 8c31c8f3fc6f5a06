use chrono::{DateTime, NaiveDate, Utc};

use crate::dates::elapsed_seconds_since;
use crate::domain::{DailyTimer, DailyUsage};

/// Daily wear goal in hours.
pub const GOAL_HOURS: u64 = 22;

/// Host cadence for the foreground tick while the timer runs.
pub const TICK_INTERVAL_SECS: u64 = 1;
/// Host cadence for the midnight-rollover watch while foregrounded.
pub const ROLLOVER_CHECK_INTERVAL_SECS: u64 = 60;

impl DailyTimer {
    pub fn fresh(date: NaiveDate) -> Self {
        Self {
            date,
            seconds_today: 0,
            running: false,
            last_checkpoint: None,
        }
    }

    /// Stopped -> Running. No-op when already running, so the original
    /// checkpoint survives a repeated start.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_checkpoint = Some(now);
    }

    pub fn pause(&mut self) {
        self.running = false;
        self.last_checkpoint = None;
    }

    /// Foreground tick. Only counts while running.
    pub fn tick(&mut self, seconds: u64) {
        if !self.running {
            return;
        }
        self.seconds_today += seconds;
    }

    /// If the calendar day moved on, archive the finished day under the
    /// aligner that was active on it and reset to a stopped timer for
    /// `today`. Zero-second days reset without leaving a record.
    pub fn rollover_if_day_changed(
        &mut self,
        today: NaiveDate,
        aligner_number: u32,
    ) -> Option<DailyUsage> {
        if self.date == today {
            return None;
        }

        let archived = (self.seconds_today > 0).then(|| DailyUsage {
            date: self.date,
            seconds_without_aligner: self.seconds_today,
            aligner_number,
        });
        *self = DailyTimer::fresh(today);
        archived
    }

    /// Catch up on time that passed while no tick was firing (process
    /// suspended). Adds the whole seconds since the checkpoint in one
    /// jump and re-checkpoints at `now`.
    pub fn sync_elapsed(&mut self, now: DateTime<Utc>) {
        if !self.running {
            return;
        }
        let Some(checkpoint) = self.last_checkpoint else {
            return;
        };

        let elapsed = elapsed_seconds_since(checkpoint, now);
        if elapsed > 0 {
            self.seconds_today += elapsed as u64;
            self.last_checkpoint = Some(now);
        }
    }
}

pub fn is_goal_reached(seconds: u64, goal_hours: u64) -> bool {
    seconds >= goal_hours * 3600
}

/// Progress toward the daily wear goal, capped at 100.
pub fn daily_progress(seconds: u64, goal_hours: u64) -> u8 {
    let goal_seconds = goal_hours * 3600;
    if goal_seconds == 0 {
        return 100;
    }
    let percent = (seconds as f64 / goal_seconds as f64 * 100.0).round() as u64;
    percent.min(100) as u8
}
