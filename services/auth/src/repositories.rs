//! Repositories for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::{ForgotPassword, NewUser, User};

pub mod forgot_password;
#[cfg(test)]
pub mod memory;
pub mod user;

/// User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; a taken email yields `DatabaseError::Duplicate`
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User>;

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    /// Replace the stored hash, returning whether a user matched
    async fn update_password(&self, email: &str, password_hash: &str) -> DatabaseResult<bool>;
}

/// Storage for forgot-password codes
#[async_trait]
pub trait ForgotPasswordRepository: Send + Sync {
    async fn save(&self, record: &ForgotPassword) -> DatabaseResult<()>;

    /// Newest record with this code for this user
    async fn find_by_otp_and_user(
        &self,
        otp: i32,
        user_id: Uuid,
    ) -> DatabaseResult<Option<ForgotPassword>>;

    async fn mark_verified(&self, id: Uuid, verified_at: DateTime<Utc>) -> DatabaseResult<()>;

    /// Most recently verified record for the user, if any
    async fn find_latest_verified(&self, user_id: Uuid) -> DatabaseResult<Option<ForgotPassword>>;

    async fn delete(&self, id: Uuid) -> DatabaseResult<()>;

    /// Remove every record of the user, returning how many were removed
    async fn delete_for_user(&self, user_id: Uuid) -> DatabaseResult<u64>;
}
