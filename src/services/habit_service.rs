//! Domain service for habit management.
//!
//! This module provides the [`HabitService`] trait. Every operation is scoped
//! to an already-authenticated owner; a habit owned by someone else behaves
//! exactly like a missing one.

use thiserror::Error;

use crate::domain::{
    Habit, HabitFilter, HabitId, HabitLog, HabitPatch, NewHabit, NewHabitLog, Page, UserId,
};

/// Domain errors for habit operations.
#[derive(Debug, Error)]
pub enum HabitError {
    #[error("Habit {0} not found")]
    NotFound(HabitId),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<sea_orm::DbErr> for HabitError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}

impl From<anyhow::Error> for HabitError {
    fn from(err: anyhow::Error) -> Self {
        Self::StorageUnavailable(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait HabitService: Send + Sync {
    /// Runs the reset sweep over the owner's active habits, then returns one
    /// filtered page ordered newest first.
    ///
    /// # Errors
    ///
    /// - [`HabitError::StorageUnavailable`] on store failures
    async fn list_habits(
        &self,
        owner: UserId,
        filter: HabitFilter,
        page: Page,
    ) -> Result<Vec<Habit>, HabitError>;

    /// # Errors
    ///
    /// - [`HabitError::InvalidArgument`] if title or description is empty or too long
    async fn create_habit(&self, owner: UserId, new: NewHabit) -> Result<Habit, HabitError>;

    async fn get_habit(&self, owner: UserId, id: HabitId) -> Result<Habit, HabitError>;

    /// Applies field edits, then a completion change through the streak rule.
    ///
    /// # Errors
    ///
    /// - [`HabitError::NotFound`] if the habit does not exist for this owner
    /// - [`HabitError::InvalidArgument`] on bad text lengths
    /// - [`HabitError::Conflict`] if the habit changed concurrently
    async fn update_habit(
        &self,
        owner: UserId,
        id: HabitId,
        patch: HabitPatch,
    ) -> Result<Habit, HabitError>;

    async fn delete_habit(&self, owner: UserId, id: HabitId) -> Result<(), HabitError>;

    async fn toggle_archive(&self, owner: UserId, id: HabitId) -> Result<Habit, HabitError>;

    /// Runs the reset sweep now. Returns how many habits had `completed` cleared.
    async fn reset_habits(&self, owner: UserId) -> Result<usize, HabitError>;

    /// # Errors
    ///
    /// - [`HabitError::Conflict`] if the day already has an entry
    async fn append_log(
        &self,
        owner: UserId,
        id: HabitId,
        log: NewHabitLog,
    ) -> Result<HabitLog, HabitError>;

    async fn list_logs(&self, owner: UserId, id: HabitId) -> Result<Vec<HabitLog>, HabitError>;
}
