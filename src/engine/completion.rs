use chrono::{DateTime, Utc};

use crate::domain::Habit;

/// Applies a manual completion change.
///
/// Checking a habit stamps `last_completed` and extends the streak; unchecking
/// shortens the streak but keeps `last_completed`, so later period math still
/// sees the last real completion. Supplying the current value changes nothing.
#[must_use]
pub fn apply_completion_toggle(habit: &Habit, completed: bool, now: DateTime<Utc>) -> Habit {
    if habit.completed == completed {
        return habit.clone();
    }

    let mut next = habit.clone();
    next.completed = completed;

    if completed {
        next.last_completed = Some(now);
        next.streak = habit.streak.saturating_add(1);
    } else {
        next.streak = habit.streak.saturating_sub(1);
    }

    next
}

#[must_use]
pub fn toggle_archive(habit: &Habit) -> Habit {
    Habit {
        is_archived: !habit.is_archived,
        ..habit.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Frequency;
    use crate::engine::fixtures::{completed_habit, habit};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_check_stamps_and_increments() {
        let h = habit(Frequency::Daily, now() - Duration::days(3));
        let next = apply_completion_toggle(&h, true, now());
        assert!(next.completed);
        assert_eq!(next.streak, 1);
        assert_eq!(next.last_completed, Some(now()));
    }

    #[test]
    fn test_uncheck_decrements_and_keeps_last_completed() {
        let done_at = now() - Duration::hours(2);
        let h = completed_habit(Frequency::Daily, done_at, 4);
        let next = apply_completion_toggle(&h, false, now());
        assert!(!next.completed);
        assert_eq!(next.streak, 3);
        assert_eq!(next.last_completed, Some(done_at));
    }

    #[test]
    fn test_uncheck_never_goes_negative() {
        let h = completed_habit(Frequency::Weekly, now(), 0);
        let next = apply_completion_toggle(&h, false, now());
        assert_eq!(next.streak, 0);
    }

    #[test]
    fn test_same_value_is_a_no_op() {
        let h = completed_habit(Frequency::Monthly, now() - Duration::days(1), 2);
        assert_eq!(apply_completion_toggle(&h, true, now()), h);

        let fresh = habit(Frequency::Monthly, now());
        assert_eq!(apply_completion_toggle(&fresh, false, now()), fresh);
    }

    #[test]
    fn test_round_trip_restores_streak() {
        let first = now() - Duration::hours(5);
        let h = completed_habit(Frequency::Daily, first, 6);

        let unchecked = apply_completion_toggle(&h, false, now() - Duration::hours(1));
        let rechecked = apply_completion_toggle(&unchecked, true, now());

        assert_eq!(rechecked.streak, 6);
        assert!(rechecked.completed);
        assert_eq!(rechecked.last_completed, Some(now()));
    }

    #[test]
    fn test_archive_toggle_leaves_streak_alone() {
        let h = completed_habit(Frequency::Daily, now(), 3);
        let archived = toggle_archive(&h);
        assert!(archived.is_archived);
        assert_eq!(archived.streak, 3);
        assert!(archived.completed);
        assert!(!toggle_archive(&archived).is_archived);
    }
}
