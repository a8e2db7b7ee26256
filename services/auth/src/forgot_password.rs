//! Forgot-password flow: issue a code by email, verify it, then reset
//!
//! A code lives for [`OTP_TTL_SECONDS`]. Checking it successfully marks the
//! record verified, and a password change is only accepted within
//! [`RESET_WINDOW_SECONDS`] of that verification. A successful change removes
//! every code the user holds.

use chrono::{Duration, Utc};
use rand::Rng;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    email::EmailSender,
    error::{AuthError, AuthResult},
    models::{ChangePassword, ForgotPassword, MailBody, User},
    password::hash_password,
    repositories::{ForgotPasswordRepository, UserRepository},
    validation::{normalize_email, validate_password},
};

pub const OTP_TTL_SECONDS: i64 = 70;
pub const RESET_WINDOW_SECONDS: i64 = 300;

const OTP_SUBJECT: &str = "OTP for Forgot Password request";

#[derive(Clone)]
pub struct ForgotPasswordService {
    users: Arc<dyn UserRepository>,
    otps: Arc<dyn ForgotPasswordRepository>,
    mailer: Arc<dyn EmailSender>,
}

/// Six-digit code
pub fn generate_otp() -> i32 {
    rand::thread_rng().gen_range(100_000..=999_999)
}

impl ForgotPasswordService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        otps: Arc<dyn ForgotPasswordRepository>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            users,
            otps,
            mailer,
        }
    }

    async fn user_by_email(&self, email: &str) -> AuthResult<User> {
        self.users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| AuthError::NotFound("Please provide an valid email!".to_string()))
    }

    /// Issue a fresh code for the account and mail it
    pub async fn verify_email(&self, email: &str) -> AuthResult<()> {
        let user = self.user_by_email(email).await?;

        let otp = generate_otp();
        let record = ForgotPassword::new(
            otp,
            Utc::now() + Duration::seconds(OTP_TTL_SECONDS),
            user.id,
        );
        self.otps.save(&record).await?;

        let mail = MailBody {
            to: user.email.clone(),
            subject: OTP_SUBJECT.to_string(),
            text: format!("This is the OTP for your Forgot Password request: {}", otp),
        };
        if let Err(e) = self.mailer.send(&mail).await {
            self.otps.delete(record.id).await?;
            return Err(e.into());
        }

        info!("Issued password reset code for {}", user.email);
        Ok(())
    }

    /// Check a code; an expired one is removed
    pub async fn verify_otp(&self, otp: i32, email: &str) -> AuthResult<()> {
        let user = self.user_by_email(email).await?;

        let record = self
            .otps
            .find_by_otp_and_user(otp, user.id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("Invalid OTP for email {}", email)))?;

        let now = Utc::now();
        if record.is_expired(now) {
            self.otps.delete(record.id).await?;
            warn!("Expired reset code presented for {}", email);
            return Err(AuthError::OtpExpired);
        }

        self.otps.mark_verified(record.id, now).await?;
        info!("Reset code verified for {}", email);
        Ok(())
    }

    /// Replace the password of an account holding a recently verified code
    pub async fn change_password(&self, email: &str, request: ChangePassword) -> AuthResult<()> {
        if request.password != request.repeat_password {
            return Err(AuthError::PasswordMismatch);
        }
        validate_password(&request.password).map_err(AuthError::BadRequest)?;

        let user = self.user_by_email(email).await?;

        let verified_at = self
            .otps
            .find_latest_verified(user.id)
            .await?
            .and_then(|record| record.verified_at)
            .ok_or(AuthError::OtpNotVerified)?;
        if Utc::now() - verified_at > Duration::seconds(RESET_WINDOW_SECONDS) {
            return Err(AuthError::OtpNotVerified);
        }

        let password_hash = hash_password(&request.password)?;
        if !self.users.update_password(&user.email, &password_hash).await? {
            return Err(AuthError::NotFound(
                "Please provide an valid email!".to_string(),
            ));
        }

        let consumed = self.otps.delete_for_user(user.id).await?;
        info!(
            "Password changed for {} ({} reset codes consumed)",
            user.email, consumed
        );
        Ok(())
    }
}
