use chrono::{DateTime, Datelike, Days, Utc};

use crate::domain::{Frequency, Habit};

/// What a reset did to a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetOutcome {
    /// `completed` went from true to false.
    pub cleared: bool,
    /// More than one full period was missed and a positive streak was zeroed.
    pub streak_broken: bool,
}

impl ResetOutcome {
    #[must_use]
    pub const fn did_reset(self) -> bool {
        self.cleared
    }

    #[must_use]
    pub const fn changed(self) -> bool {
        self.cleared || self.streak_broken
    }
}

/// Instant period boundaries are measured from: the last completion, or creation
/// for a habit that was never completed.
#[must_use]
pub fn reference_instant(habit: &Habit) -> DateTime<Utc> {
    habit.last_completed.unwrap_or(habit.created_at)
}

/// Whole days between the reference instant and `now`.
#[must_use]
pub fn elapsed_days(habit: &Habit, now: DateTime<Utc>) -> i64 {
    (now - reference_instant(habit)).num_days()
}

/// Whether `now` falls in a later period than the habit's reference instant.
///
/// Periods are UTC calendar days, ISO weeks starting Monday, and calendar months.
#[must_use]
pub fn reset_due(habit: &Habit, now: DateTime<Utc>) -> bool {
    let reference = reference_instant(habit).date_naive();
    let today = now.date_naive();

    match habit.frequency {
        Frequency::Daily => reference < today,
        Frequency::Weekly => {
            let since_monday = u64::from(now.weekday().num_days_from_monday());
            let week_start = today - Days::new(since_monday);
            reference < week_start
        }
        Frequency::Monthly => {
            (reference.year(), reference.month()) != (today.year(), today.month())
        }
    }
}

/// Rolls a habit over into the current period.
///
/// The completed flag is only ever cleared, never set. The streak is zeroed when
/// the gap since the reference instant exceeds the frequency's grace window; a
/// rollover inside a single elapsed period keeps it. The due check works on
/// calendar boundaries while the streak check works on elapsed duration, so the
/// two can disagree near week and month edges.
#[must_use]
pub fn apply_reset(habit: &Habit, now: DateTime<Utc>) -> (Habit, ResetOutcome) {
    if !reset_due(habit, now) {
        return (habit.clone(), ResetOutcome::default());
    }

    let mut next = habit.clone();
    let mut outcome = ResetOutcome::default();

    if next.completed {
        next.completed = false;
        outcome.cleared = true;
    }

    if next.streak > 0 && elapsed_days(habit, now) > habit.frequency.grace_days() {
        next.streak = 0;
        outcome.streak_broken = true;
    }

    (next, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{completed_habit, habit};
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_daily_completed_before_today_is_due() {
        let now = at(2025, 3, 10, 8);
        for hours_back in [9, 24, 47, 200] {
            let h = completed_habit(Frequency::Daily, now - Duration::hours(hours_back), 3);
            assert!(reset_due(&h, now), "{hours_back}h back should be due");
        }
    }

    #[test]
    fn test_daily_completed_today_is_not_due() {
        let now = at(2025, 3, 10, 23);
        let h = completed_habit(Frequency::Daily, at(2025, 3, 10, 0), 3);
        assert!(!reset_due(&h, now));
        let (next, outcome) = apply_reset(&h, now);
        assert_eq!(next, h);
        assert!(!outcome.changed());
    }

    #[test]
    fn test_yesterday_clears_completed_but_keeps_streak() {
        let now = at(2025, 3, 10, 8);
        let h = completed_habit(Frequency::Daily, at(2025, 3, 9, 20), 4);
        let (next, outcome) = apply_reset(&h, now);
        assert!(outcome.did_reset());
        assert!(!outcome.streak_broken);
        assert!(!next.completed);
        assert_eq!(next.streak, 4);
        assert_eq!(next.last_completed, h.last_completed);
    }

    #[test]
    fn test_missed_days_break_the_streak() {
        let now = at(2025, 3, 10, 8);
        let h = completed_habit(Frequency::Daily, at(2025, 3, 7, 8), 9);
        let (next, outcome) = apply_reset(&h, now);
        assert!(outcome.cleared);
        assert!(outcome.streak_broken);
        assert_eq!(next.streak, 0);
    }

    #[test]
    fn test_never_completed_daily_habit_created_long_ago() {
        let now = at(2025, 3, 10, 8);
        let mut h = habit(Frequency::Daily, now - Duration::days(40));
        h.streak = 2;

        assert!(reset_due(&h, now));
        let (next, outcome) = apply_reset(&h, now);
        assert!(!outcome.cleared);
        assert!(outcome.streak_broken);
        assert!(!next.completed);
        assert_eq!(next.streak, 0);
        assert_eq!(next.last_completed, None);
    }

    #[test]
    fn test_weekly_tuesday_to_next_monday() {
        // 2025-01-07 is a Tuesday, 2025-01-13 the following Monday.
        let h = completed_habit(Frequency::Weekly, at(2025, 1, 7, 18), 5);
        assert!(!reset_due(&h, at(2025, 1, 12, 22)));

        let monday = at(2025, 1, 13, 7);
        assert!(reset_due(&h, monday));
        let (next, outcome) = apply_reset(&h, monday);
        assert!(outcome.cleared);
        assert_eq!(next.streak, 5);

        let toggled = crate::engine::apply_completion_toggle(&next, true, monday);
        assert_eq!(toggled.streak, 6);
        assert!(toggled.completed);
    }

    #[test]
    fn test_weekly_gap_across_weekend_is_calendar_based() {
        // Completed Sunday, checked Monday: one elapsed day but a new week.
        let h = completed_habit(Frequency::Weekly, at(2025, 1, 12, 10), 2);
        let (next, outcome) = apply_reset(&h, at(2025, 1, 13, 9));
        assert!(outcome.cleared);
        assert_eq!(next.streak, 2);
    }

    #[test]
    fn test_monthly_jan_31_to_feb_1() {
        let h = completed_habit(Frequency::Monthly, at(2025, 1, 31, 12), 7);
        let feb_first = at(2025, 2, 1, 12);
        assert!(reset_due(&h, feb_first));
        let (next, outcome) = apply_reset(&h, feb_first);
        assert!(outcome.cleared);
        assert!(!outcome.streak_broken);
        assert_eq!(next.streak, 7);
    }

    #[test]
    fn test_monthly_same_month_not_due_and_year_rollover_due() {
        let h = completed_habit(Frequency::Monthly, at(2024, 12, 1, 0), 1);
        assert!(!reset_due(&h, at(2024, 12, 31, 23)));
        assert!(reset_due(&h, at(2025, 1, 1, 0)));

        let stale = completed_habit(Frequency::Monthly, at(2024, 10, 15, 0), 3);
        let (next, outcome) = apply_reset(&stale, at(2025, 1, 2, 0));
        assert!(outcome.streak_broken);
        assert_eq!(next.streak, 0);
    }

    #[test]
    fn test_not_completed_and_inside_grace_is_untouched() {
        let now = at(2025, 3, 10, 8);
        let mut h = completed_habit(Frequency::Daily, at(2025, 3, 9, 8), 3);
        h.completed = false;
        let (next, outcome) = apply_reset(&h, now);
        assert!(!outcome.changed());
        assert_eq!(next, h);
    }

    #[test]
    fn test_reset_never_raises_streak_and_is_idempotent() {
        let now = at(2025, 6, 15, 12);
        let frequencies = [Frequency::Daily, Frequency::Weekly, Frequency::Monthly];
        for frequency in frequencies {
            for days_back in [0_i64, 1, 2, 6, 8, 30, 32, 400] {
                for streak in [0_u32, 1, 12] {
                    for completed in [false, true] {
                        let mut h =
                            completed_habit(frequency, now - Duration::days(days_back), streak);
                        h.completed = completed;

                        let (once, first) = apply_reset(&h, now);
                        let (twice, second) = apply_reset(&once, now);

                        assert!(once.streak <= h.streak);
                        assert_eq!(once, twice, "{frequency} {days_back}d {streak}");
                        assert!(!second.cleared);
                        assert!(!second.streak_broken);
                        if first.cleared {
                            assert!(h.completed);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_archived_flag_does_not_affect_pure_rule() {
        let now = at(2025, 3, 10, 8);
        let mut h = completed_habit(Frequency::Daily, at(2025, 3, 1, 8), 3);
        h.is_archived = true;
        let (next, _) = apply_reset(&h, now);
        assert!(next.is_archived);
        assert!(!next.completed);
    }
}
