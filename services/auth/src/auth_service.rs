//! Registration, login and token refresh

use common::token::{JwtService, Role, TokenType};
use std::{collections::HashSet, sync::Arc};
use tracing::{info, warn};

use crate::{
    error::{AuthError, AuthResult},
    models::{AuthResponse, LoginRequest, NewUser, RefreshTokenRequest, RegisterRequest, User},
    password::{hash_password, verify_password},
    repositories::UserRepository,
    validation::{normalize_email, validate_email, validate_name, validate_password},
};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt_service: JwtService,
    admin_emails: Arc<HashSet<String>>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt_service: JwtService) -> Self {
        Self {
            users,
            jwt_service,
            admin_emails: Arc::new(HashSet::new()),
        }
    }

    /// Accounts registered with one of these emails get the `ADMIN` role
    pub fn with_admin_emails(mut self, emails: impl IntoIterator<Item = String>) -> Self {
        self.admin_emails = Arc::new(
            emails
                .into_iter()
                .map(|e| normalize_email(&e))
                .filter(|e| !e.is_empty())
                .collect(),
        );
        self
    }

    pub async fn register(&self, request: RegisterRequest) -> AuthResult<AuthResponse> {
        let email = normalize_email(&request.email);
        validate_name(&request.name).map_err(AuthError::BadRequest)?;
        validate_email(&email).map_err(AuthError::BadRequest)?;
        validate_password(&request.password).map_err(AuthError::BadRequest)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict("Email is already registered".to_string()));
        }

        let role = if self.admin_emails.contains(&email) {
            Role::Admin
        } else {
            Role::User
        };

        let user = self
            .users
            .create(&NewUser {
                name: request.name.trim().to_string(),
                email,
                password_hash: hash_password(&request.password)?,
                role,
            })
            .await?;

        info!("Registered user {} with role {}", user.email, user.role);
        let refresh_token =
            self.jwt_service
                .generate_refresh_token(user.id, &user.email, user.role)?;
        self.respond(&user, refresh_token)
    }

    pub async fn login(&self, request: LoginRequest) -> AuthResult<AuthResponse> {
        let email = normalize_email(&request.email);
        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("Login attempt for unknown email: {}", email);
                return Err(AuthError::Unauthorized);
            }
        };

        if !verify_password(&request.password, &user.password_hash)? {
            warn!("Wrong password for user: {}", user.email);
            return Err(AuthError::Unauthorized);
        }

        info!("User logged in: {}", user.email);
        let refresh_token =
            self.jwt_service
                .generate_refresh_token(user.id, &user.email, user.role)?;
        self.respond(&user, refresh_token)
    }

    /// Issue a new access token; the refresh token is handed back unchanged
    pub async fn refresh(&self, request: RefreshTokenRequest) -> AuthResult<AuthResponse> {
        let claims = self
            .jwt_service
            .validate_token_of_type(&request.refresh_token, TokenType::Refresh)
            .map_err(|e| {
                warn!("Rejected refresh token: {}", e);
                AuthError::Unauthorized
            })?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        self.respond(&user, request.refresh_token)
    }

    fn respond(&self, user: &User, refresh_token: String) -> AuthResult<AuthResponse> {
        let access_token = self
            .jwt_service
            .generate_access_token(user.id, &user.email, user.role)?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            name: user.name.clone(),
            email: user.email.clone(),
        })
    }
}
