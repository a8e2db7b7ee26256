use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod file_store;
mod middleware;
mod models;
mod movie_service;
mod repositories;
mod routes;
mod settings;
mod state;

use common::{
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    token::{JwtConfig, JwtService},
};

use crate::{
    file_store::FileStore, movie_service::MovieService, repositories::movie::PgMovieRepository,
    settings::ApiConfig, state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting API service");

    let api_config = ApiConfig::from_env()?;

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

    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    let file_store = FileStore::new(&api_config.poster_dir);
    file_store.init().await?;

    let movie_service = MovieService::new(
        Arc::new(PgMovieRepository::new(pool)),
        file_store.clone(),
        api_config.base_url.clone(),
    );

    let app_state = AppState {
        movie_service,
        file_store,
        jwt_service,
    };

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state, api_config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&api_config.bind_addr).await?;
    info!("API service listening on {}", api_config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
