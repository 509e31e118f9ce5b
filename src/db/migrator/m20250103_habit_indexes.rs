use crate::entities::{habit_logs, habits, prelude::*};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const IDX_HABITS_OWNER_CREATED: &str = "idx_habits_user_created";
const IDX_HABIT_LOGS_DAY: &str = "idx_habit_logs_habit_date";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Listing is always owner-scoped and newest first.
        manager
            .create_index(
                Index::create()
                    .name(IDX_HABITS_OWNER_CREATED)
                    .table(Habits)
                    .col(habits::Column::UserId)
                    .col(habits::Column::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One log entry per habit per day.
        manager
            .create_index(
                Index::create()
                    .name(IDX_HABIT_LOGS_DAY)
                    .table(HabitLogs)
                    .col(habit_logs::Column::HabitId)
                    .col(habit_logs::Column::Date)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_HABIT_LOGS_DAY)
                    .table(HabitLogs)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_HABITS_OWNER_CREATED)
                    .table(Habits)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
