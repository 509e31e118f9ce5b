//! `SeaORM` implementation of the `HabitService` trait.
//!
//! Writes go through [`Store::save_habit`], which only commits when the row
//! still carries the version that was read. The reset sweep treats a lost race
//! as "try again on the next read"; a user update reports it as a conflict.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::{SaveOutcome, Store};
use crate::domain::{
    Habit, HabitFilter, HabitId, HabitLog, HabitPatch, NewHabit, NewHabitLog, Page, UserId,
};
use crate::engine::{ResetOutcome, apply_completion_toggle, apply_reset, toggle_archive};
use crate::services::habit_service::{HabitError, HabitService};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct SeaOrmHabitService {
    store: Store,
    clock: Clock,
}

impl SeaOrmHabitService {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self::with_clock(store, Arc::new(Utc::now))
    }

    #[must_use]
    pub fn with_clock(store: Store, clock: Clock) -> Self {
        Self { store, clock }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    async fn load(&self, owner: UserId, id: HabitId) -> Result<Habit, HabitError> {
        self.store
            .find_habit(owner, id)
            .await?
            .ok_or(HabitError::NotFound(id))
    }

    async fn commit(&self, habit: &Habit, now: DateTime<Utc>) -> Result<Habit, HabitError> {
        match self.store.save_habit(habit, now).await? {
            SaveOutcome::Saved(saved) => Ok(saved),
            SaveOutcome::Conflict => Err(HabitError::Conflict(format!(
                "Habit {} was modified concurrently, retry the request",
                habit.id
            ))),
            SaveOutcome::NotFound => Err(HabitError::NotFound(habit.id)),
        }
    }

    /// Rolls every active habit of `owner` into the current period.
    async fn sweep(&self, owner: UserId) -> Result<usize, HabitError> {
        let now = self.now();
        let habits = self.store.find_active_habits(owner).await?;
        let mut cleared = 0;

        for habit in &habits {
            let (next, outcome) = apply_reset(habit, now);
            if !outcome.changed() {
                continue;
            }

            match self.store.save_habit(&next, now).await? {
                SaveOutcome::Saved(_) => {
                    record_reset(habit, outcome);
                    if outcome.cleared {
                        cleared += 1;
                    }
                }
                SaveOutcome::Conflict | SaveOutcome::NotFound => {
                    warn!(habit_id = %habit.id, "Habit changed during reset, skipping");
                }
            }
        }

        debug!(user_id = %owner, checked = habits.len(), cleared, "Reset sweep finished");
        Ok(cleared)
    }
}

fn record_reset(habit: &Habit, outcome: ResetOutcome) {
    if outcome.cleared {
        metrics::counter!("habits_reset_total").increment(1);
    }
    if outcome.streak_broken {
        metrics::counter!("habit_streak_breaks_total").increment(1);
        debug!(habit_id = %habit.id, streak = habit.streak, "Streak broken");
    }
}

fn check_text(field: &str, value: &str, max: usize) -> Result<(), HabitError> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(HabitError::InvalidArgument(format!("{field} cannot be empty")));
    }
    if value.chars().count() > max {
        return Err(HabitError::InvalidArgument(format!(
            "{field} must be {max} characters or less"
        )));
    }
    Ok(())
}

fn apply_patch_fields(habit: &mut Habit, patch: HabitPatch) -> Result<(), HabitError> {
    if let Some(title) = patch.title {
        check_text("Title", &title, MAX_TITLE_LEN)?;
        habit.title = title;
    }
    if let Some(description) = patch.description {
        check_text("Description", &description, MAX_DESCRIPTION_LEN)?;
        habit.description = description;
    }
    if let Some(frequency) = patch.frequency {
        habit.frequency = frequency;
    }
    if let Some(category) = patch.category {
        habit.category = category;
    }
    if let Some(time_of_day) = patch.time_of_day {
        habit.time_of_day = Some(time_of_day);
    }
    if let Some(reminder_time) = patch.reminder_time {
        habit.reminder_time = Some(reminder_time);
    }
    Ok(())
}

#[async_trait]
impl HabitService for SeaOrmHabitService {
    async fn list_habits(
        &self,
        owner: UserId,
        filter: HabitFilter,
        page: Page,
    ) -> Result<Vec<Habit>, HabitError> {
        self.sweep(owner).await?;
        Ok(self.store.list_habits(owner, filter, page).await?)
    }

    async fn create_habit(&self, owner: UserId, new: NewHabit) -> Result<Habit, HabitError> {
        check_text("Title", &new.title, MAX_TITLE_LEN)?;
        check_text("Description", &new.description, MAX_DESCRIPTION_LEN)?;

        Ok(self.store.create_habit(owner, &new, self.now()).await?)
    }

    async fn get_habit(&self, owner: UserId, id: HabitId) -> Result<Habit, HabitError> {
        self.load(owner, id).await
    }

    async fn update_habit(
        &self,
        owner: UserId,
        id: HabitId,
        patch: HabitPatch,
    ) -> Result<Habit, HabitError> {
        let now = self.now();
        let current = self.load(owner, id).await?;
        let completed = patch.completed;
        let archived = patch.is_archived;

        // A toggle lands in the current period, so roll the stored row over first.
        // Archived rows are never rolled over.
        let (mut next, rollover) = if completed.is_some() && !current.is_archived {
            apply_reset(&current, now)
        } else {
            (current.clone(), ResetOutcome::default())
        };
        apply_patch_fields(&mut next, patch)?;

        if let Some(completed) = completed {
            next = apply_completion_toggle(&next, completed, now);
        }
        if let Some(archived) = archived {
            next.is_archived = archived;
        }

        if next == current {
            return Ok(current);
        }

        let saved = self.commit(&next, now).await?;
        record_reset(&current, rollover);
        if saved.streak != current.streak {
            info!(habit_id = %id, from = current.streak, to = saved.streak, "Streak updated");
        }
        Ok(saved)
    }

    async fn delete_habit(&self, owner: UserId, id: HabitId) -> Result<(), HabitError> {
        if self.store.delete_habit(owner, id).await? {
            Ok(())
        } else {
            Err(HabitError::NotFound(id))
        }
    }

    async fn toggle_archive(&self, owner: UserId, id: HabitId) -> Result<Habit, HabitError> {
        let current = self.load(owner, id).await?;
        self.commit(&toggle_archive(&current), self.now()).await
    }

    async fn reset_habits(&self, owner: UserId) -> Result<usize, HabitError> {
        let cleared = self.sweep(owner).await?;
        info!(user_id = %owner, cleared, "Manual reset finished");
        Ok(cleared)
    }

    async fn append_log(
        &self,
        owner: UserId,
        id: HabitId,
        log: NewHabitLog,
    ) -> Result<HabitLog, HabitError> {
        let habit = self.load(owner, id).await?;
        self.store
            .append_habit_log(habit.id, &log)
            .await?
            .ok_or_else(|| {
                HabitError::Conflict(format!("Habit {id} already has a log for {}", log.date))
            })
    }

    async fn list_logs(&self, owner: UserId, id: HabitId) -> Result<Vec<HabitLog>, HabitError> {
        let habit = self.load(owner, id).await?;
        Ok(self.store.list_habit_logs(habit.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::domain::{Category, Frequency};
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    struct Fixture {
        service: SeaOrmHabitService,
        store: Store,
        owner: UserId,
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl Fixture {
        fn set_now(&self, now: DateTime<Utc>) {
            *self.now.lock().unwrap() = now;
        }
    }

    async fn fixture(start: DateTime<Utc>) -> Fixture {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        let owner = store
            .create_user("svc@example.com", "Service", "password123", &security)
            .await
            .unwrap()
            .unwrap()
            .id;

        let now = Arc::new(Mutex::new(start));
        let clock_now = now.clone();
        let service = SeaOrmHabitService::with_clock(
            store.clone(),
            Arc::new(move || *clock_now.lock().unwrap()),
        );

        Fixture {
            service,
            store,
            owner,
            now,
        }
    }

    fn new_habit(frequency: Frequency) -> NewHabit {
        NewHabit {
            title: "Morning run".to_string(),
            description: "5km before work".to_string(),
            frequency,
            category: Category::Fitness,
            time_of_day: Some("morning".to_string()),
            reminder_time: None,
        }
    }

    fn complete(completed: bool) -> HabitPatch {
        HabitPatch {
            completed: Some(completed),
            ..HabitPatch::default()
        }
    }

    #[tokio::test]
    async fn test_list_clears_yesterdays_completion() {
        let monday = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let fx = fixture(monday).await;
        let habit = fx
            .service
            .create_habit(fx.owner, new_habit(Frequency::Daily))
            .await
            .unwrap();

        let done = fx
            .service
            .update_habit(fx.owner, habit.id, complete(true))
            .await
            .unwrap();
        assert_eq!(done.streak, 1);
        assert_eq!(done.last_completed, Some(monday));

        fx.set_now(monday + Duration::days(1));
        let listed = fx
            .service
            .list_habits(fx.owner, HabitFilter::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].completed);
        assert_eq!(listed[0].streak, 1);

        let again = fx
            .service
            .update_habit(fx.owner, habit.id, complete(true))
            .await
            .unwrap();
        assert_eq!(again.streak, 2);
    }

    #[tokio::test]
    async fn test_completion_in_new_week_without_listing() {
        let tuesday = Utc.with_ymd_and_hms(2025, 1, 7, 18, 0, 0).unwrap();
        let fx = fixture(tuesday).await;
        let habit = fx
            .service
            .create_habit(fx.owner, new_habit(Frequency::Weekly))
            .await
            .unwrap();
        fx.service
            .update_habit(fx.owner, habit.id, complete(true))
            .await
            .unwrap();

        let monday = Utc.with_ymd_and_hms(2025, 1, 13, 7, 0, 0).unwrap();
        fx.set_now(monday);
        let toggled = fx
            .service
            .update_habit(fx.owner, habit.id, complete(true))
            .await
            .unwrap();
        assert!(toggled.completed);
        assert_eq!(toggled.streak, 2);
        assert_eq!(toggled.last_completed, Some(monday));
        assert_eq!(toggled.updated_at, monday);

        let listed = fx
            .service
            .list_habits(fx.owner, HabitFilter::default(), Page::default())
            .await
            .unwrap();
        assert!(listed[0].completed);
        assert_eq!(listed[0].streak, 2);
    }

    #[tokio::test]
    async fn test_completion_after_missed_weeks_starts_over() {
        let start = Utc.with_ymd_and_hms(2025, 1, 7, 18, 0, 0).unwrap();
        let fx = fixture(start).await;
        let habit = fx
            .service
            .create_habit(fx.owner, new_habit(Frequency::Weekly))
            .await
            .unwrap();
        fx.service
            .update_habit(fx.owner, habit.id, complete(true))
            .await
            .unwrap();

        fx.set_now(start + Duration::days(21));
        let toggled = fx
            .service
            .update_habit(fx.owner, habit.id, complete(true))
            .await
            .unwrap();
        assert_eq!(toggled.streak, 1);
        assert!(toggled.updated_at >= toggled.created_at);
    }

    #[tokio::test]
    async fn test_sweep_skips_archived_and_counts_cleared() {
        let start = Utc.with_ymd_and_hms(2025, 1, 7, 18, 0, 0).unwrap();
        let fx = fixture(start).await;

        let active = fx
            .service
            .create_habit(fx.owner, new_habit(Frequency::Weekly))
            .await
            .unwrap();
        let archived = fx
            .service
            .create_habit(fx.owner, new_habit(Frequency::Weekly))
            .await
            .unwrap();
        for id in [active.id, archived.id] {
            fx.service
                .update_habit(fx.owner, id, complete(true))
                .await
                .unwrap();
        }
        fx.service.toggle_archive(fx.owner, archived.id).await.unwrap();

        fx.set_now(Utc.with_ymd_and_hms(2025, 1, 13, 7, 0, 0).unwrap());
        assert_eq!(fx.service.reset_habits(fx.owner).await.unwrap(), 1);
        assert_eq!(fx.service.reset_habits(fx.owner).await.unwrap(), 0);

        let kept = fx.service.get_habit(fx.owner, archived.id).await.unwrap();
        assert!(kept.completed);
        assert!(kept.is_archived);
    }

    #[tokio::test]
    async fn test_update_with_stale_version_conflicts() {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        let fx = fixture(now).await;
        let habit = fx
            .service
            .create_habit(fx.owner, new_habit(Frequency::Monthly))
            .await
            .unwrap();

        let mut concurrent = habit.clone();
        concurrent.title = "Renamed elsewhere".to_string();
        assert!(matches!(
            fx.store.save_habit(&concurrent, now).await.unwrap(),
            SaveOutcome::Saved(_)
        ));

        let err = fx
            .service
            .commit(&toggle_archive(&habit), now)
            .await
            .unwrap_err();
        assert!(matches!(err, HabitError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_text_limits() {
        let fx = fixture(Utc::now()).await;
        let mut bad = new_habit(Frequency::Daily);
        bad.title = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(matches!(
            fx.service.create_habit(fx.owner, bad).await,
            Err(HabitError::InvalidArgument(_))
        ));

        let mut blank = new_habit(Frequency::Daily);
        blank.description = "   ".to_string();
        assert!(matches!(
            fx.service.create_habit(fx.owner, blank).await,
            Err(HabitError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_noop_update_does_not_bump_version() {
        let fx = fixture(Utc::now()).await;
        let habit = fx
            .service
            .create_habit(fx.owner, new_habit(Frequency::Daily))
            .await
            .unwrap();
        let same = fx
            .service
            .update_habit(fx.owner, habit.id, complete(false))
            .await
            .unwrap();
        assert_eq!(same.version, habit.version);
    }
}
