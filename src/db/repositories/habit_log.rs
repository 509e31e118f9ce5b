use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::is_unique_violation;

use crate::domain::time::{
    format_date, format_time, format_timestamp, parse_date, parse_time, parse_timestamp,
};
use crate::domain::{HabitId, HabitLog, NewHabitLog};
use crate::entities::{habit_logs, prelude::*};

pub struct HabitLogRepository {
    conn: DatabaseConnection,
}

impl HabitLogRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: habit_logs::Model) -> Result<HabitLog> {
        Ok(HabitLog {
            id: m.id,
            habit_id: HabitId::new(m.habit_id),
            date: parse_date(&m.date)?,
            completed: m.completed,
            completion_time: m.completion_time.as_deref().map(parse_time).transpose()?,
            notes: m.notes,
            created_at: parse_timestamp(&m.created_at)?,
        })
    }

    /// Records one day for a habit. Returns `None` if that day already has an entry.
    ///
    /// The unique `(habit_id, date)` index decides, so two racing appends for
    /// the same day yield one row and one `None`.
    pub async fn append(&self, habit_id: HabitId, log: &NewHabitLog) -> Result<Option<HabitLog>> {
        let active = habit_logs::ActiveModel {
            habit_id: Set(habit_id.value()),
            date: Set(format_date(log.date)),
            completed: Set(log.completed),
            completion_time: Set(log.completion_time.map(format_time)),
            notes: Set(log.notes.clone()),
            created_at: Set(format_timestamp(Utc::now())),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Self::map_model(model).map(Some),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e).context("Failed to insert habit log"),
        }
    }

    /// Newest day first.
    pub async fn list_for_habit(&self, habit_id: HabitId) -> Result<Vec<HabitLog>> {
        let rows = HabitLogs::find()
            .filter(habit_logs::Column::HabitId.eq(habit_id.value()))
            .order_by_desc(habit_logs::Column::Date)
            .all(&self.conn)
            .await
            .context("Failed to list habit logs")?;

        rows.into_iter().map(Self::map_model).collect()
    }
}
