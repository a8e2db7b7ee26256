//! PostgreSQL movie repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::debug;

use super::MovieRepository;
use crate::models::movie::{Movie, NewMovie, Page, PageRequest};

const MOVIE_COLUMNS: &str =
    "movie_id, title, director, studio, movie_cast, release_year, poster";

/// Movie repository backed by the `movies` table
#[derive(Clone)]
pub struct PgMovieRepository {
    pool: PgPool,
}

impl PgMovieRepository {
    /// Create a new movie repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieRepository for PgMovieRepository {
    async fn find_by_id(&self, id: i32) -> DatabaseResult<Option<Movie>> {
        sqlx::query_as::<_, Movie>(&format!(
            "SELECT {} FROM movies WHERE movie_id = $1",
            MOVIE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    async fn find_all(&self) -> DatabaseResult<Vec<Movie>> {
        sqlx::query_as::<_, Movie>(&format!(
            "SELECT {} FROM movies ORDER BY movie_id",
            MOVIE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    async fn insert(&self, movie: &NewMovie) -> DatabaseResult<Movie> {
        sqlx::query_as::<_, Movie>(&format!(
            r#"
            INSERT INTO movies (title, director, studio, movie_cast, release_year, poster)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            MOVIE_COLUMNS
        ))
        .bind(&movie.title)
        .bind(&movie.director)
        .bind(&movie.studio)
        .bind(&movie.movie_cast)
        .bind(movie.release_year)
        .bind(&movie.poster)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn update(&self, movie: &Movie) -> DatabaseResult<Movie> {
        sqlx::query_as::<_, Movie>(&format!(
            r#"
            UPDATE movies
            SET title = $2, director = $3, studio = $4, movie_cast = $5,
                release_year = $6, poster = $7
            WHERE movie_id = $1
            RETURNING {}
            "#,
            MOVIE_COLUMNS
        ))
        .bind(movie.movie_id)
        .bind(&movie.title)
        .bind(&movie.director)
        .bind(&movie.studio)
        .bind(&movie.movie_cast)
        .bind(movie.release_year)
        .bind(&movie.poster)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE movie_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_page(&self, request: &PageRequest) -> DatabaseResult<Page<Movie>> {
        // Column and direction come from closed enums, never from raw input
        let order_by = match request.sort {
            Some(sort) => format!(
                "{} {}, movie_id ASC",
                sort.field.column(),
                sort.direction.as_sql()
            ),
            None => "movie_id ASC".to_string(),
        };
        debug!(
            "Fetching movie page {} (size {}) ordered by {}",
            request.page, request.size, order_by
        );

        let items = sqlx::query_as::<_, Movie>(&format!(
            "SELECT {} FROM movies ORDER BY {} LIMIT $1 OFFSET $2",
            MOVIE_COLUMNS, order_by
        ))
        .bind(request.size as i64)
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(Page { items, total })
    }
}
