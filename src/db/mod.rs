use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::{Habit, HabitFilter, HabitId, HabitLog, NewHabit, NewHabitLog, Page, UserId};

pub mod migrator;
pub mod repositories;

pub use repositories::habit::SaveOutcome;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to `:memory:` would see its own empty database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);
        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!("Database connected & migrations applied (pool: {min_connections}-{max_connections})");

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn habit_repo(&self) -> repositories::habit::HabitRepository {
        repositories::habit::HabitRepository::new(self.conn.clone())
    }

    fn habit_log_repo(&self) -> repositories::habit_log::HabitLogRepository {
        repositories::habit_log::HabitLogRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    // ========== Habit Repository Methods ==========

    pub async fn create_habit(
        &self,
        owner: UserId,
        habit: &NewHabit,
        created_at: DateTime<Utc>,
    ) -> Result<Habit> {
        self.habit_repo().insert(owner, habit, created_at).await
    }

    pub async fn find_habit(&self, owner: UserId, id: HabitId) -> Result<Option<Habit>> {
        self.habit_repo().find(owner, id).await
    }

    pub async fn find_active_habits(&self, owner: UserId) -> Result<Vec<Habit>> {
        self.habit_repo().find_active(owner).await
    }

    pub async fn list_habits(
        &self,
        owner: UserId,
        filter: HabitFilter,
        page: Page,
    ) -> Result<Vec<Habit>> {
        self.habit_repo().list(owner, filter, page).await
    }

    pub async fn save_habit(&self, habit: &Habit, now: DateTime<Utc>) -> Result<SaveOutcome> {
        self.habit_repo().save(habit, now).await
    }

    pub async fn delete_habit(&self, owner: UserId, id: HabitId) -> Result<bool> {
        self.habit_repo().delete(owner, id).await
    }

    // ========== Habit Log Repository Methods ==========

    pub async fn append_habit_log(
        &self,
        habit_id: HabitId,
        log: &NewHabitLog,
    ) -> Result<Option<HabitLog>> {
        self.habit_log_repo().append(habit_id, log).await
    }

    pub async fn list_habit_logs(&self, habit_id: HabitId) -> Result<Vec<HabitLog>> {
        self.habit_log_repo().list_for_habit(habit_id).await
    }

    // ========== User Repository Methods ==========

    pub async fn create_user(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
        config: &SecurityConfig,
    ) -> Result<Option<User>> {
        self.user_repo()
            .create(email, full_name, password, config)
            .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<bool> {
        self.user_repo().delete_cascade(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Frequency};

    async fn store() -> Store {
        Store::new("sqlite::memory:").await.unwrap()
    }

    fn fast_security() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    fn new_habit(title: &str, frequency: Frequency) -> NewHabit {
        NewHabit {
            title: title.to_string(),
            description: String::new(),
            frequency,
            category: Category::Health,
            time_of_day: None,
            reminder_time: None,
        }
    }

    async fn owner(store: &Store, email: &str) -> UserId {
        store
            .create_user(email, "Owner", "password123", &fast_security())
            .await
            .unwrap()
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let store = store().await;
        let user = owner(&store, "a@example.com").await;
        let habit = store
            .create_habit(user, &new_habit("Walk", Frequency::Daily), Utc::now())
            .await
            .unwrap();
        assert_eq!(habit.version, 1);

        let mut first = habit.clone();
        first.completed = true;
        first.streak = 1;
        let SaveOutcome::Saved(saved) = store.save_habit(&first, Utc::now()).await.unwrap() else {
            panic!("first write should commit");
        };
        assert_eq!(saved.version, 2);
        assert!(saved.completed);

        let mut stale = habit.clone();
        stale.title = "Run".to_string();
        assert!(matches!(
            store.save_habit(&stale, Utc::now()).await.unwrap(),
            SaveOutcome::Conflict
        ));

        let current = store.find_habit(user, habit.id).await.unwrap().unwrap();
        assert_eq!(current.title, "Walk");
        assert_eq!(current.streak, 1);
    }

    #[tokio::test]
    async fn test_habits_are_scoped_to_owner() {
        let store = store().await;
        let alice = owner(&store, "alice@example.com").await;
        let bob = owner(&store, "bob@example.com").await;

        let habit = store
            .create_habit(alice, &new_habit("Stretch", Frequency::Weekly), Utc::now())
            .await
            .unwrap();

        assert!(store.find_habit(bob, habit.id).await.unwrap().is_none());
        assert!(!store.delete_habit(bob, habit.id).await.unwrap());

        let mut hijack = habit.clone();
        hijack.owner_id = bob;
        assert!(matches!(
            store.save_habit(&hijack, Utc::now()).await.unwrap(),
            SaveOutcome::NotFound
        ));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_filters() {
        let store = store().await;
        let user = owner(&store, "list@example.com").await;
        let base = Utc::now() - chrono::Duration::days(3);

        for (i, freq) in [Frequency::Daily, Frequency::Weekly, Frequency::Daily]
            .into_iter()
            .enumerate()
        {
            store
                .create_habit(
                    user,
                    &new_habit(&format!("H{i}"), freq),
                    base + chrono::Duration::hours(i as i64),
                )
                .await
                .unwrap();
        }

        let all = store
            .list_habits(user, HabitFilter::default(), Page::default())
            .await
            .unwrap();
        let titles: Vec<_> = all.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, ["H2", "H1", "H0"]);

        let daily = store
            .list_habits(
                user,
                HabitFilter {
                    frequency: Some(Frequency::Daily),
                    ..HabitFilter::default()
                },
                Page { skip: 1, limit: 10 },
            )
            .await
            .unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].title, "H0");
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let store = store().await;
        let user = owner(&store, "gone@example.com").await;
        let habit = store
            .create_habit(user, &new_habit("Journal", Frequency::Daily), Utc::now())
            .await
            .unwrap();
        let log = NewHabitLog {
            date: Utc::now().date_naive(),
            completed: true,
            completion_time: None,
            notes: None,
        };
        assert!(store.append_habit_log(habit.id, &log).await.unwrap().is_some());
        assert!(store.append_habit_log(habit.id, &log).await.unwrap().is_none());

        assert!(store.delete_user(user).await.unwrap());
        assert!(store.get_user(user).await.unwrap().is_none());
        let remaining = store
            .list_habits(
                user,
                HabitFilter {
                    include_archived: true,
                    ..HabitFilter::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert!(remaining.is_empty());
        assert!(store.list_habit_logs(habit.id).await.unwrap().is_empty());
    }
}
