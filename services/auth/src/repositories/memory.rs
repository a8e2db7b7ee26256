//! In-memory repositories used by tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use std::sync::Mutex;
use uuid::Uuid;

use super::{ForgotPasswordRepository, UserRepository};
use crate::models::{ForgotPassword, NewUser, User};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn password_hash_of(&self, email: &str) -> Option<String> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.password_hash.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::Duplicate("users_email_key".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> DatabaseResult<bool> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryForgotPasswordRepository {
    records: Mutex<Vec<ForgotPassword>>,
}

impl InMemoryForgotPasswordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ForgotPassword> {
        self.records.lock().unwrap().clone()
    }

    /// Move every expiration of the user's codes into the past
    pub fn expire_all(&self, user_id: Uuid) {
        let past = Utc::now() - chrono::Duration::seconds(1);
        for record in self.records.lock().unwrap().iter_mut() {
            if record.user_id == user_id {
                record.expiration_time = past;
            }
        }
    }

    /// Shift the verification time of the user's codes
    pub fn set_verified_at(&self, user_id: Uuid, at: DateTime<Utc>) {
        for record in self.records.lock().unwrap().iter_mut() {
            if record.user_id == user_id && record.verified_at.is_some() {
                record.verified_at = Some(at);
            }
        }
    }
}

#[async_trait]
impl ForgotPasswordRepository for InMemoryForgotPasswordRepository {
    async fn save(&self, record: &ForgotPassword) -> DatabaseResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn find_by_otp_and_user(
        &self,
        otp: i32,
        user_id: Uuid,
    ) -> DatabaseResult<Option<ForgotPassword>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.otp == otp && r.user_id == user_id)
            .max_by_key(|r| r.expiration_time)
            .cloned())
    }

    async fn mark_verified(&self, id: Uuid, verified_at: DateTime<Utc>) -> DatabaseResult<()> {
        if let Some(record) = self.records.lock().unwrap().iter_mut().find(|r| r.id == id) {
            record.verified_at = Some(verified_at);
        }
        Ok(())
    }

    async fn find_latest_verified(&self, user_id: Uuid) -> DatabaseResult<Option<ForgotPassword>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.user_id == user_id && r.verified_at.is_some())
            .max_by_key(|r| r.verified_at)
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> DatabaseResult<u64> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.user_id != user_id);
        Ok((before - records.len()) as u64)
    }
}
