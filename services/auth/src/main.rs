use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod auth_service;
mod email;
mod error;
mod forgot_password;
mod models;
mod password;
mod repositories;
mod routes;
mod validation;

use common::{
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    token::{JwtConfig, JwtService},
};

use crate::{
    auth_service::AuthService,
    email::EmailConfig,
    forgot_password::ForgotPasswordService,
    repositories::{forgot_password::PgForgotPasswordRepository, user::PgUserRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub forgot_password_service: ForgotPasswordService,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting authentication service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }
    run_migrations(&pool).await?;

    // Initialize JWT service
    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    let mailer = email::build_sender(EmailConfig::from_env(), email::log_only_from_env())?;

    let users = Arc::new(PgUserRepository::new(pool.clone()));
    let admin_emails = std::env::var("ADMIN_EMAILS")
        .map(|list| list.split(',').map(str::to_string).collect::<Vec<_>>())
        .unwrap_or_default();

    let app_state = AppState {
        auth_service: AuthService::new(users.clone(), jwt_service).with_admin_emails(admin_emails),
        forgot_password_service: ForgotPasswordService::new(
            users,
            Arc::new(PgForgotPasswordRepository::new(pool)),
            mailer,
        ),
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    info!("Authentication service listening on 0.0.0.0:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
