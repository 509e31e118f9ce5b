use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::domain::time::{format_timestamp, parse_timestamp};
use crate::domain::{Habit, HabitFilter, HabitId, NewHabit, Page, UserId};
use crate::entities::{habit_logs, habits, prelude::*};

/// Result of a version-checked write.
#[derive(Debug)]
pub enum SaveOutcome {
    Saved(Habit),
    /// The row changed since it was read.
    Conflict,
    /// The row no longer exists for this owner.
    NotFound,
}

/// Repository for habit rows. Every query is scoped by owner.
pub struct HabitRepository {
    conn: DatabaseConnection,
}

impl HabitRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Model Conversion Helpers
    // ========================================================================

    /// Decodes a row. Unknown enum text or a negative streak is a data error and
    /// is reported, never defaulted.
    fn map_model(m: habits::Model) -> Result<Habit> {
        let id = m.id;
        Ok(Habit {
            id: HabitId::new(m.id),
            owner_id: UserId::new(m.user_id),
            title: m.title,
            description: m.description,
            frequency: m
                .frequency
                .parse()
                .with_context(|| format!("Corrupt habit row {id}"))?,
            category: m
                .category
                .parse()
                .with_context(|| format!("Corrupt habit row {id}"))?,
            time_of_day: m.time_of_day,
            reminder_time: m.reminder_time,
            streak: u32::try_from(m.streak)
                .with_context(|| format!("Negative streak on habit {id}"))?,
            completed: m.completed,
            last_completed: m
                .last_completed
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            is_archived: m.is_archived,
            created_at: parse_timestamp(&m.created_at)?,
            updated_at: parse_timestamp(&m.updated_at)?,
            version: m.version,
        })
    }

    fn map_models(rows: Vec<habits::Model>) -> Result<Vec<Habit>> {
        rows.into_iter().map(Self::map_model).collect()
    }

    // ========================================================================
    // Habit Operations
    // ========================================================================

    pub async fn insert(
        &self,
        owner: UserId,
        new: &NewHabit,
        created_at: DateTime<Utc>,
    ) -> Result<Habit> {
        let stamp = format_timestamp(created_at);
        let active = habits::ActiveModel {
            user_id: Set(owner.value()),
            title: Set(new.title.clone()),
            description: Set(new.description.clone()),
            frequency: Set(new.frequency.as_str().to_string()),
            category: Set(new.category.as_str().to_string()),
            time_of_day: Set(new.time_of_day.clone()),
            reminder_time: Set(new.reminder_time.clone()),
            streak: Set(0),
            completed: Set(false),
            last_completed: Set(None),
            is_archived: Set(false),
            version: Set(1),
            created_at: Set(stamp.clone()),
            updated_at: Set(stamp),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert habit")?;

        info!(habit_id = model.id, user_id = owner.value(), "Created habit '{}'", model.title);
        Self::map_model(model)
    }

    pub async fn find(&self, owner: UserId, id: HabitId) -> Result<Option<Habit>> {
        let row = Habits::find_by_id(id.value())
            .filter(habits::Column::UserId.eq(owner.value()))
            .one(&self.conn)
            .await
            .context("Failed to query habit")?;

        row.map(Self::map_model).transpose()
    }

    /// Non-archived habits of one owner, the set the reset sweep runs over.
    pub async fn find_active(&self, owner: UserId) -> Result<Vec<Habit>> {
        let rows = Habits::find()
            .filter(habits::Column::UserId.eq(owner.value()))
            .filter(habits::Column::IsArchived.eq(false))
            .order_by_asc(habits::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query active habits")?;

        Self::map_models(rows)
    }

    pub async fn list(&self, owner: UserId, filter: HabitFilter, page: Page) -> Result<Vec<Habit>> {
        let mut query = Habits::find().filter(habits::Column::UserId.eq(owner.value()));

        if !filter.include_archived {
            query = query.filter(habits::Column::IsArchived.eq(false));
        }
        if let Some(category) = filter.category {
            query = query.filter(habits::Column::Category.eq(category.as_str()));
        }
        if let Some(frequency) = filter.frequency {
            query = query.filter(habits::Column::Frequency.eq(frequency.as_str()));
        }
        if let Some(completed) = filter.completed {
            query = query.filter(habits::Column::Completed.eq(completed));
        }

        let rows = query
            .order_by_desc(habits::Column::CreatedAt)
            .order_by_desc(habits::Column::Id)
            .offset(page.skip)
            .limit(page.limit)
            .all(&self.conn)
            .await
            .context("Failed to list habits")?;

        Self::map_models(rows)
    }

    /// Writes every mutable column if the row still carries `habit.version`.
    ///
    /// The conditional update and the read-back run in one transaction, so a
    /// concurrent reset and completion toggle can never both commit against the
    /// same snapshot.
    pub async fn save(&self, habit: &Habit, now: DateTime<Utc>) -> Result<SaveOutcome> {
        let streak = i32::try_from(habit.streak).context("Streak out of range")?;
        let txn = self.conn.begin().await?;

        let active = habits::ActiveModel {
            title: Set(habit.title.clone()),
            description: Set(habit.description.clone()),
            frequency: Set(habit.frequency.as_str().to_string()),
            category: Set(habit.category.as_str().to_string()),
            time_of_day: Set(habit.time_of_day.clone()),
            reminder_time: Set(habit.reminder_time.clone()),
            streak: Set(streak),
            completed: Set(habit.completed),
            last_completed: Set(habit.last_completed.map(format_timestamp)),
            is_archived: Set(habit.is_archived),
            version: Set(habit.version + 1),
            updated_at: Set(format_timestamp(now)),
            ..Default::default()
        };

        let result = Habits::update_many()
            .set(active)
            .filter(habits::Column::Id.eq(habit.id.value()))
            .filter(habits::Column::UserId.eq(habit.owner_id.value()))
            .filter(habits::Column::Version.eq(habit.version))
            .exec(&txn)
            .await
            .context("Failed to update habit")?;

        if result.rows_affected == 0 {
            let exists = Habits::find_by_id(habit.id.value())
                .filter(habits::Column::UserId.eq(habit.owner_id.value()))
                .count(&txn)
                .await?
                > 0;
            txn.rollback().await?;
            return Ok(if exists {
                SaveOutcome::Conflict
            } else {
                SaveOutcome::NotFound
            });
        }

        let row = Habits::find_by_id(habit.id.value())
            .one(&txn)
            .await?
            .context("Habit vanished inside its own transaction")?;

        txn.commit().await?;
        Ok(SaveOutcome::Saved(Self::map_model(row)?))
    }

    /// Hard delete of a habit and its log history.
    pub async fn delete(&self, owner: UserId, id: HabitId) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let owned = Habits::find_by_id(id.value())
            .filter(habits::Column::UserId.eq(owner.value()))
            .count(&txn)
            .await?
            > 0;

        if !owned {
            txn.rollback().await?;
            return Ok(false);
        }

        HabitLogs::delete_many()
            .filter(habit_logs::Column::HabitId.eq(id.value()))
            .exec(&txn)
            .await?;

        Habits::delete_by_id(id.value()).exec(&txn).await?;

        txn.commit().await?;
        info!(habit_id = id.value(), user_id = owner.value(), "Deleted habit");
        Ok(true)
    }
}
