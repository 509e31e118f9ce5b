//! Habit lifecycle rules.
//!
//! Everything here is pure: functions take a habit snapshot plus the current
//! instant and return the next snapshot. Persisting the result is the caller's
//! job, which keeps the rules testable without a database.

pub mod completion;
pub mod reset;

pub use completion::{apply_completion_toggle, toggle_archive};
pub use reset::{ResetOutcome, apply_reset, elapsed_days, reference_instant, reset_due};

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Utc};

    use crate::domain::{Category, Frequency, Habit, HabitId, UserId};

    pub fn habit(frequency: Frequency, created_at: DateTime<Utc>) -> Habit {
        Habit {
            id: HabitId::new(1),
            owner_id: UserId::new(1),
            title: "Read".to_string(),
            description: "Twenty pages".to_string(),
            frequency,
            category: Category::Learning,
            time_of_day: None,
            reminder_time: None,
            streak: 0,
            completed: false,
            last_completed: None,
            is_archived: false,
            created_at,
            updated_at: created_at,
            version: 1,
        }
    }

    pub fn completed_habit(
        frequency: Frequency,
        completed_at: DateTime<Utc>,
        streak: u32,
    ) -> Habit {
        Habit {
            streak,
            completed: true,
            last_completed: Some(completed_at),
            ..habit(frequency, completed_at - chrono::Duration::days(90))
        }
    }
}
