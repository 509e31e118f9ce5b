use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::db::User;
use crate::domain::time::{format_date, format_time, format_timestamp};
use crate::domain::{Category, Frequency, Habit, HabitLog, HabitPatch, NewHabit, NewHabitLog};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

// ============================================================================
// Habits
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HabitDto {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: String,
    pub frequency: Frequency,
    pub category: Category,
    pub time_of_day: Option<String>,
    pub reminder_time: Option<String>,
    pub streak: u32,
    pub completed: bool,
    pub last_completed: Option<String>,
    pub is_archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Habit> for HabitDto {
    fn from(h: Habit) -> Self {
        Self {
            id: h.id.value(),
            user_id: h.owner_id.value(),
            title: h.title,
            description: h.description,
            frequency: h.frequency,
            category: h.category,
            time_of_day: h.time_of_day,
            reminder_time: h.reminder_time,
            streak: h.streak,
            completed: h.completed,
            last_completed: h.last_completed.map(format_timestamp),
            is_archived: h.is_archived,
            created_at: format_timestamp(h.created_at),
            updated_at: format_timestamp(h.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub title: String,
    pub description: String,
    pub frequency: Frequency,
    pub category: Category,
    #[serde(default)]
    pub time_of_day: Option<String>,
    #[serde(default)]
    pub reminder_time: Option<String>,
}

impl From<CreateHabitRequest> for NewHabit {
    fn from(req: CreateHabitRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            frequency: req.frequency,
            category: req.category,
            time_of_day: req.time_of_day,
            reminder_time: req.reminder_time,
        }
    }
}

/// Partial update. `last_completed` is owned by the streak rule; a client-sent value is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateHabitRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<Frequency>,
    pub category: Option<Category>,
    pub time_of_day: Option<String>,
    pub reminder_time: Option<String>,
    pub completed: Option<bool>,
    pub is_archived: Option<bool>,
}

impl From<UpdateHabitRequest> for HabitPatch {
    fn from(req: UpdateHabitRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            frequency: req.frequency,
            category: req.category,
            time_of_day: req.time_of_day,
            reminder_time: req.reminder_time,
            completed: req.completed,
            is_archived: req.is_archived,
        }
    }
}

/// Raw list query; enum values are parsed by the handler so errors read well.
#[derive(Debug, Default, Deserialize)]
pub struct ListHabitsQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub include_archived: bool,
    pub category: Option<String>,
    pub frequency: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub reset_count: usize,
    pub message: String,
}

// ============================================================================
// Habit logs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HabitLogDto {
    pub id: i32,
    pub habit_id: i32,
    pub date: String,
    pub completed: bool,
    pub completion_time: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<HabitLog> for HabitLogDto {
    fn from(log: HabitLog) -> Self {
        Self {
            id: log.id,
            habit_id: log.habit_id.value(),
            date: format_date(log.date),
            completed: log.completed,
            completion_time: log.completion_time.map(format_time),
            notes: log.notes,
            created_at: format_timestamp(log.created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitLogRequest {
    pub date: NaiveDate,
    pub completed: bool,
    #[serde(default)]
    pub completion_time: Option<NaiveTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<CreateHabitLogRequest> for NewHabitLog {
    fn from(req: CreateHabitLogRequest) -> Self {
        Self {
            date: req.date,
            completed: req.completed,
            completion_time: req.completion_time,
            notes: req.notes,
        }
    }
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id.value(),
            email: user.email,
            full_name: user.full_name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    #[must_use]
    pub const fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub uptime_seconds: u64,
    pub version: &'static str,
}
