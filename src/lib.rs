//! Core state for an orthodontic aligner wear tracker: the tray
//! schedule, the daily out-of-mouth stopwatch, and the reconciliation
//! that runs when the app comes back to the foreground.
//!
//! The crate owns no UI, no notification delivery and no background
//! scheduler. A host drives one [`Store`] from a single thread, feeds it
//! [`Action`]s carrying explicit timestamps, ticks the running timer
//! once a second and watches for day rollover about once a minute
//! ([`timer::TICK_INTERVAL_SECS`], [`timer::ROLLOVER_CHECK_INTERVAL_SECS`]),
//! cancelling both watchers when the owning view goes away. Change
//! reminders come out as [`notify::ChangeReminder`] intents for the
//! platform notifier to deliver.

pub mod dates;
pub mod domain;
pub mod notify;
pub mod schedule;
pub mod storage;
pub mod store;
pub mod timer;

pub use domain::{Aligner, AppState, DailyTimer, DailyUsage, TreatmentConfig};
pub use notify::{ChangeReminder, NotificationGateway};
pub use schedule::ScheduleError;
pub use storage::{JsonFileStore, MemoryStore, StateStore, StorageError};
pub use store::{reconcile_on_resume, transition, Action, Store};
