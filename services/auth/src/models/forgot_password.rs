//! One-time codes issued by the forgot-password flow

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A reset code owned by one user
#[derive(Debug, Clone, FromRow)]
pub struct ForgotPassword {
    pub id: Uuid,
    pub otp: i32,
    pub expiration_time: DateTime<Utc>,
    /// Set once the code has been checked successfully
    pub verified_at: Option<DateTime<Utc>>,
    pub user_id: Uuid,
}

impl ForgotPassword {
    pub fn new(otp: i32, expiration_time: DateTime<Utc>, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            otp,
            expiration_time,
            verified_at: None,
            user_id,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_time < now
    }
}

/// Body of the change-password request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    pub password: String,
    pub repeat_password: String,
}

/// Plain-text mail message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailBody {
    pub to: String,
    pub subject: String,
    pub text: String,
}
