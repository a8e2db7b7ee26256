//! PostgreSQL storage for forgot-password codes

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::ForgotPasswordRepository;
use crate::models::ForgotPassword;

const FORGOT_PASSWORD_COLUMNS: &str = "id, otp, expiration_time, verified_at, user_id";

#[derive(Clone)]
pub struct PgForgotPasswordRepository {
    pool: PgPool,
}

impl PgForgotPasswordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ForgotPasswordRepository for PgForgotPasswordRepository {
    async fn save(&self, record: &ForgotPassword) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO forgot_password (id, otp, expiration_time, verified_at, user_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id)
        .bind(record.otp)
        .bind(record.expiration_time)
        .bind(record.verified_at)
        .bind(record.user_id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn find_by_otp_and_user(
        &self,
        otp: i32,
        user_id: Uuid,
    ) -> DatabaseResult<Option<ForgotPassword>> {
        sqlx::query_as::<_, ForgotPassword>(&format!(
            r#"
            SELECT {} FROM forgot_password
            WHERE otp = $1 AND user_id = $2
            ORDER BY expiration_time DESC
            LIMIT 1
            "#,
            FORGOT_PASSWORD_COLUMNS
        ))
        .bind(otp)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    async fn mark_verified(&self, id: Uuid, verified_at: DateTime<Utc>) -> DatabaseResult<()> {
        sqlx::query("UPDATE forgot_password SET verified_at = $2 WHERE id = $1")
            .bind(id)
            .bind(verified_at)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(())
    }

    async fn find_latest_verified(&self, user_id: Uuid) -> DatabaseResult<Option<ForgotPassword>> {
        sqlx::query_as::<_, ForgotPassword>(&format!(
            r#"
            SELECT {} FROM forgot_password
            WHERE user_id = $1 AND verified_at IS NOT NULL
            ORDER BY verified_at DESC
            LIMIT 1
            "#,
            FORGOT_PASSWORD_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM forgot_password WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM forgot_password WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected())
    }
}
