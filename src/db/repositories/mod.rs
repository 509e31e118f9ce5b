use sea_orm::{DbErr, SqlErr};

pub mod habit;
pub mod habit_log;
pub mod user;

/// True when an insert lost to a unique index.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
