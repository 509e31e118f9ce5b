use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::domain::UserId;
use crate::domain::time::format_timestamp;
use crate::entities::{habit_logs, habits, prelude::*, users};

use super::is_unique_violation;

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            email: model.email,
            full_name: model.full_name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates a user, hashing the password with the configured Argon2 params.
    /// Returns `None` when the email is already registered.
    pub async fn create(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
        config: &SecurityConfig,
    ) -> Result<Option<User>> {
        if self.get_by_email(email).await?.is_some() {
            return Ok(None);
        }

        let password = password.to_string();
        let config = config.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")??;

        self.insert_hashed(email, full_name, password_hash).await
    }

    /// Inserts an account row. A concurrent registration that already took
    /// the email surfaces as `None` through the unique email index.
    async fn insert_hashed(
        &self,
        email: &str,
        full_name: &str,
        password_hash: String,
    ) -> Result<Option<User>> {
        let now = format_timestamp(Utc::now());
        let active = users::ActiveModel {
            email: Set(email.to_string()),
            full_name: Set(full_name.to_string()),
            password_hash: Set(password_hash),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(Some(User::from(model))),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e).context("Failed to insert user"),
        }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let user = Users::find_by_id(id.value())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Verifies a password and returns the user on success.
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid.then(|| User::from(user)))
    }

    /// Deletes a user together with its habits and their logs in one transaction.
    pub async fn delete_cascade(&self, id: UserId) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let habit_ids: Vec<i32> = Habits::find()
            .select_only()
            .column(habits::Column::Id)
            .filter(habits::Column::UserId.eq(id.value()))
            .into_tuple()
            .all(&txn)
            .await
            .context("Failed to collect habits for user deletion")?;

        if !habit_ids.is_empty() {
            HabitLogs::delete_many()
                .filter(habit_logs::Column::HabitId.is_in(habit_ids))
                .exec(&txn)
                .await?;
        }

        Habits::delete_many()
            .filter(habits::Column::UserId.eq(id.value()))
            .exec(&txn)
            .await?;

        let result = Users::delete_by_id(id.value()).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }
}

/// Hash a password using Argon2id with the configured params.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None, // output length (use default)
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
