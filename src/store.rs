use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::dates::calendar_day;
use crate::domain::{AppState, TreatmentConfig};
use crate::schedule::{self, ScheduleError};
use crate::storage::StateStore;

/// Every mutation of [`AppState`]. Variants carry their own timestamps;
/// the transition function never reads a clock.
#[derive(Debug, Clone)]
pub enum Action {
    CompleteSetup {
        start_date: String,
        days_per_aligner: u32,
        total_aligners: u32,
    },
    StartTimer {
        now: DateTime<Utc>,
    },
    PauseTimer,
    Tick {
        seconds: u64,
    },
    /// Archive and reset the timer when the calendar day moved on. Fed by
    /// the host's once-a-minute watch and accepted before any other timer
    /// mutation for the new day.
    CheckRollover {
        today: NaiveDate,
    },
    /// Checkpoint catch-up after a suspension while running.
    SyncElapsed {
        now: DateTime<Utc>,
    },
    ResetTimerToday,
    MarkAlignerCompleted {
        number: u32,
    },
    UnmarkAlignerCompleted {
        number: u32,
    },
    /// Manual end-date edit; later aligners cascade to stay contiguous.
    EditAlignerEndDate {
        number: u32,
        new_end_date: NaiveDate,
    },
    RefreshCurrentAligner {
        today: NaiveDate,
    },
    SetNotificationsEnabled {
        enabled: bool,
    },
    ResetAllData {
        today: NaiveDate,
        now: DateTime<Utc>,
    },
}

/// Pure `(state, action) -> state`. The only fallible path is setup
/// validation; everything else is total.
pub fn transition(state: &AppState, action: Action) -> Result<AppState, ScheduleError> {
    let mut next = state.clone();

    match action {
        Action::CompleteSetup {
            start_date,
            days_per_aligner,
            total_aligners,
        } => {
            let aligners =
                schedule::generate_from_input(&start_date, days_per_aligner, total_aligners)?;
            next.treatment_config = TreatmentConfig {
                start_date: Some(aligners[0].start_date),
                days_per_aligner,
                total_aligners,
                configured: true,
            };
            next.aligner_history = aligners;
            next.current_aligner_number = 1;
        }
        Action::StartTimer { now } => next.daily_timer.start(now),
        Action::PauseTimer => next.daily_timer.pause(),
        Action::Tick { seconds } => next.daily_timer.tick(seconds),
        Action::CheckRollover { today } => {
            let aligner_number = next.current_aligner_number;
            if let Some(usage) = next.daily_timer.rollover_if_day_changed(today, aligner_number) {
                next.daily_usage_history.push(usage);
            }
        }
        Action::SyncElapsed { now } => next.daily_timer.sync_elapsed(now),
        Action::ResetTimerToday => {
            next.daily_timer.seconds_today = 0;
            next.daily_timer.running = false;
            next.daily_timer.last_checkpoint = None;
        }
        Action::MarkAlignerCompleted { number } => set_completed(&mut next, number, true),
        Action::UnmarkAlignerCompleted { number } => set_completed(&mut next, number, false),
        Action::EditAlignerEndDate {
            number,
            new_end_date,
        } => {
            next.aligner_history = schedule::recalculate_from(
                &next.aligner_history,
                number,
                new_end_date,
                next.treatment_config.days_per_aligner,
            );
        }
        Action::RefreshCurrentAligner { today } => refresh_current_aligner(&mut next, today),
        Action::SetNotificationsEnabled { enabled } => next.notifications_enabled = enabled,
        Action::ResetAllData { today, now } => next = AppState::new(today, now),
    }

    Ok(next)
}

fn set_completed(state: &mut AppState, number: u32, completed: bool) {
    for aligner in &mut state.aligner_history {
        if aligner.number == number {
            aligner.completed = completed;
        }
    }
}

fn refresh_current_aligner(state: &mut AppState, today: NaiveDate) {
    if let Some(current) = schedule::current_aligner(&state.aligner_history, today) {
        state.current_aligner_number = current.number;
    }
}

/// Bring persisted state up to the present. Runs once per foreground
/// before any dispatched action:
///
/// - the persisted day is over: flush it into the usage history (zero
///   seconds leave no record) and reset the timer for today;
/// - still the same day with the timer left running: add the wall-clock
///   gap since the checkpoint in one jump.
///
/// Re-running with no wall-clock advance changes nothing.
pub fn reconcile_on_resume(mut state: AppState, now: DateTime<Utc>) -> AppState {
    let today = calendar_day(now);

    if state.daily_timer.date != today {
        debug!(stale_day = %state.daily_timer.date, "archiving finished day on resume");
        let aligner_number = state.current_aligner_number;
        if let Some(usage) = state.daily_timer.rollover_if_day_changed(today, aligner_number) {
            state.daily_usage_history.push(usage);
        }
    } else if state.daily_timer.running {
        state.daily_timer.sync_elapsed(now);
    }

    refresh_current_aligner(&mut state, today);
    state
}

/// The one owner of live [`AppState`]. All mutations flow through
/// [`Store::dispatch`]; every transition is followed by the commit hook,
/// which stamps `last_updated` and persists fire-and-forget.
pub struct Store<S: StateStore> {
    state: AppState,
    backend: S,
}

impl<S: StateStore> Store<S> {
    /// Load, reconcile and commit. A missing or unreadable blob starts a
    /// fresh unconfigured state instead of failing.
    pub fn open(mut backend: S, now: DateTime<Utc>) -> Self {
        let loaded = match backend.load() {
            Ok(state) => state,
            Err(err) => {
                warn!("failed to load persisted state, starting fresh: {err}");
                None
            }
        };

        let state = match loaded {
            Some(persisted) if persisted.treatment_config.configured => {
                reconcile_on_resume(persisted, now)
            }
            // Unconfigured state is left for the setup flow.
            Some(persisted) => persisted,
            None => AppState::new(calendar_day(now), now),
        };

        let mut store = Self { state, backend };
        store.commit(now);
        store
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action, now: DateTime<Utc>) -> Result<(), ScheduleError> {
        self.state = transition(&self.state, action)?;
        self.commit(now);
        Ok(())
    }

    /// Re-run resume reconciliation on the live state (app came back to
    /// the foreground without reloading).
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if !self.state.treatment_config.configured {
            return;
        }
        self.state = reconcile_on_resume(self.state.clone(), now);
        self.commit(now);
    }

    /// Wipe storage and start over unconfigured.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        if let Err(err) = self.backend.clear() {
            warn!("failed to clear persisted state: {err}");
        }
        self.state = AppState::new(calendar_day(now), now);
    }

    /// The on-commit hook: stamp and persist. Unconfigured state is never
    /// written; a failed write is logged and the in-memory state stands,
    /// the next successful write or resume reconciliation heals the gap.
    fn commit(&mut self, now: DateTime<Utc>) {
        self.state.last_updated = now;
        if !self.state.treatment_config.configured {
            return;
        }
        if let Err(err) = self.backend.save(&self.state) {
            warn!("failed to persist state: {err}");
        }
    }
}
