//! Common library for the Movieflix backend
//!
//! This crate provides shared functionality used across the auth and api
//! services, including database connectivity and migrations, error handling,
//! and JWT issuing/validation.

pub mod database;
pub mod error;
pub mod token;

/// Example usage of the database module
///
/// ```rust,no_run
/// use common::database::{DatabaseConfig, init_pool, health_check, run_migrations};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig::from_env()?;
///     let pool = init_pool(&config).await?;
///     run_migrations(&pool).await?;
///     let is_healthy = health_check(&pool).await?;
///     println!("Database health check: {}", is_healthy);
///     Ok(())
/// }
/// ```
pub use database::DatabaseConfig;
