use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Aligner;

/// Intent to show a "switch to the next tray" reminder. The crate only
/// produces these; delivery belongs to the platform layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeReminder {
    pub fire_at: DateTime<Utc>,
    pub aligner_number: u32,
    pub next_aligner_number: u32,
}

impl ChangeReminder {
    fn for_aligner(aligner: &Aligner) -> Self {
        Self {
            fire_at: aligner.change_at,
            aligner_number: aligner.number,
            next_aligner_number: aligner.number + 1,
        }
    }
}

/// Reminders still worth scheduling: change instant in the future and the
/// aligner not already marked done.
pub fn pending_reminders(schedule: &[Aligner], now: DateTime<Utc>) -> Vec<ChangeReminder> {
    schedule
        .iter()
        .filter(|aligner| aligner.change_at > now && !aligner.completed)
        .map(ChangeReminder::for_aligner)
        .collect()
}

pub trait NotificationGateway {
    fn schedule(&mut self, reminder: &ChangeReminder);
    fn cancel_all(&mut self);
}

/// Drop every scheduled reminder and re-schedule from the given schedule.
/// Run after any schedule mutation so delivered state matches the plan.
pub fn resync<G: NotificationGateway>(gateway: &mut G, schedule: &[Aligner], now: DateTime<Utc>) {
    gateway.cancel_all();
    for reminder in pending_reminders(schedule, now) {
        gateway.schedule(&reminder);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use super::{pending_reminders, resync, ChangeReminder, NotificationGateway};
    use crate::schedule;

    #[derive(Default)]
    struct RecordingGateway {
        cancelled: u32,
        scheduled: Vec<ChangeReminder>,
        log: Vec<String>,
    }

    impl NotificationGateway for RecordingGateway {
        fn schedule(&mut self, reminder: &ChangeReminder) {
            self.scheduled.push(reminder.clone());
            self.log.push(format!("schedule #{}", reminder.aligner_number));
        }

        fn cancel_all(&mut self) {
            self.cancelled += 1;
            self.log.push("cancel_all".to_string());
        }
    }

    fn schedule_of_three(now: DateTime<Utc>) -> Vec<crate::domain::Aligner> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let aligners = schedule::generate(start, 14, 3).expect("schedule should generate");
        // #1 changes in the past relative to `now`, #2 and #3 in the future.
        assert!(aligners[0].change_at < now);
        assert!(aligners[1].change_at > now);
        aligners
    }

    #[test]
    fn skips_past_and_completed_aligners() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
        let mut aligners = schedule_of_three(now);
        aligners[1].completed = true;

        let pending = pending_reminders(&aligners, now);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].aligner_number, 3);
        assert_eq!(pending[0].next_aligner_number, 4);
        assert_eq!(pending[0].fire_at, aligners[2].change_at);
    }

    #[test]
    fn resync_cancels_before_scheduling() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
        let aligners = schedule_of_three(now);

        let mut gateway = RecordingGateway::default();
        resync(&mut gateway, &aligners, now);

        assert_eq!(gateway.cancelled, 1);
        assert_eq!(gateway.log.first().map(String::as_str), Some("cancel_all"));
        assert_eq!(gateway.scheduled.len(), 2);
        assert_eq!(gateway.scheduled[0].aligner_number, 2);
        assert_eq!(gateway.scheduled[1].aligner_number, 3);
    }

    #[test]
    fn empty_schedule_produces_no_reminders() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
        assert!(pending_reminders(&[], now).is_empty());
    }
}
