//! Application state shared across handlers

use common::token::JwtService;

use crate::{file_store::FileStore, movie_service::MovieService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub movie_service: MovieService,
    pub file_store: FileStore,
    pub jwt_service: JwtService,
}
