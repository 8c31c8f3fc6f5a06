use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_DAYS_PER_ALIGNER: u32 = 14;
pub const DEFAULT_TOTAL_ALIGNERS: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentConfig {
    pub start_date: Option<NaiveDate>,
    pub days_per_aligner: u32,
    pub total_aligners: u32,
    pub configured: bool,
}

impl Default for TreatmentConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            days_per_aligner: DEFAULT_DAYS_PER_ALIGNER,
            total_aligners: DEFAULT_TOTAL_ALIGNERS,
            configured: false,
        }
    }
}

/// One tray in the generated schedule. Both date bounds are inclusive;
/// `change_at` is the reminder instant on the last day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aligner {
    pub number: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub change_at: DateTime<Utc>,
    pub completed: bool,
}

/// The in-progress day's out-of-mouth stopwatch. `last_checkpoint` is
/// set exactly while `running`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTimer {
    pub date: NaiveDate,
    pub seconds_today: u64,
    pub running: bool,
    pub last_checkpoint: Option<DateTime<Utc>>,
}

/// Archived total for a finished calendar day. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub seconds_without_aligner: u64,
    pub aligner_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub schema_version: u32,
    pub treatment_config: TreatmentConfig,
    pub daily_timer: DailyTimer,
    pub daily_usage_history: Vec<DailyUsage>,
    pub aligner_history: Vec<Aligner>,
    pub current_aligner_number: u32,
    pub notifications_enabled: bool,
    pub last_updated: DateTime<Utc>,
}

impl AppState {
    pub fn new(today: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            treatment_config: TreatmentConfig::default(),
            daily_timer: DailyTimer::fresh(today),
            daily_usage_history: Vec::new(),
            aligner_history: Vec::new(),
            current_aligner_number: 1,
            notifications_enabled: true,
            last_updated: now,
        }
    }
}

pub fn format_seconds(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    format!("{hours}h {minutes:02}m")
}

pub fn format_seconds_full(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours}h {minutes:02}m {seconds:02}s")
}
