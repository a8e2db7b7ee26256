//! Repositories for database operations

use async_trait::async_trait;
use common::error::DatabaseResult;

use crate::models::movie::{Movie, NewMovie, Page, PageRequest};

#[cfg(test)]
pub mod memory;
pub mod movie;

/// Persistence operations the movie service relies on
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Find a movie by its id
    async fn find_by_id(&self, id: i32) -> DatabaseResult<Option<Movie>>;

    /// All movies in the store's natural order
    async fn find_all(&self) -> DatabaseResult<Vec<Movie>>;

    /// Insert a new movie and return it with its generated id
    async fn insert(&self, movie: &NewMovie) -> DatabaseResult<Movie>;

    /// Overwrite every column of an existing movie
    async fn update(&self, movie: &Movie) -> DatabaseResult<Movie>;

    /// Delete a movie, returning whether a row was removed
    async fn delete(&self, id: i32) -> DatabaseResult<bool>;

    /// One page of movies plus the total count
    async fn find_page(&self, request: &PageRequest) -> DatabaseResult<Page<Movie>>;
}
