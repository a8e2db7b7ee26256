//! In-memory movie repository used by tests

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use std::{cmp::Ordering, sync::Mutex};

use super::MovieRepository;
use crate::models::movie::{Movie, NewMovie, Page, PageRequest, SortDirection, SortField};

#[derive(Default)]
pub struct InMemoryMovieRepository {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    movies: Vec<Movie>,
    last_id: i32,
    fail_writes: bool,
}

impl InMemoryMovieRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert/update fail
    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }

    pub fn allow_writes(&self) {
        self.state.lock().unwrap().fail_writes = false;
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().movies.len()
    }
}

fn compare(a: &Movie, b: &Movie, field: SortField) -> Ordering {
    match field {
        SortField::MovieId => a.movie_id.cmp(&b.movie_id),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Director => a.director.cmp(&b.director),
        SortField::Studio => a.studio.cmp(&b.studio),
        SortField::ReleaseYear => a.release_year.cmp(&b.release_year),
        SortField::Poster => a.poster.cmp(&b.poster),
    }
}

fn write_failure() -> DatabaseError {
    DatabaseError::Configuration("writes disabled".to_string())
}

#[async_trait]
impl MovieRepository for InMemoryMovieRepository {
    async fn find_by_id(&self, id: i32) -> DatabaseResult<Option<Movie>> {
        let state = self.state.lock().unwrap();
        Ok(state.movies.iter().find(|m| m.movie_id == id).cloned())
    }

    async fn find_all(&self) -> DatabaseResult<Vec<Movie>> {
        Ok(self.state.lock().unwrap().movies.clone())
    }

    async fn insert(&self, movie: &NewMovie) -> DatabaseResult<Movie> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(write_failure());
        }
        state.last_id += 1;
        let saved = Movie {
            movie_id: state.last_id,
            title: movie.title.clone(),
            director: movie.director.clone(),
            studio: movie.studio.clone(),
            movie_cast: movie.movie_cast.clone(),
            release_year: movie.release_year,
            poster: movie.poster.clone(),
        };
        state.movies.push(saved.clone());
        Ok(saved)
    }

    async fn update(&self, movie: &Movie) -> DatabaseResult<Movie> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(write_failure());
        }
        let slot = state
            .movies
            .iter_mut()
            .find(|m| m.movie_id == movie.movie_id)
            .ok_or(DatabaseError::Query(sqlx::Error::RowNotFound))?;
        *slot = movie.clone();
        Ok(movie.clone())
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.movies.len();
        state.movies.retain(|m| m.movie_id != id);
        Ok(state.movies.len() < before)
    }

    async fn find_page(&self, request: &PageRequest) -> DatabaseResult<Page<Movie>> {
        let mut movies = self.state.lock().unwrap().movies.clone();
        if let Some(sort) = request.sort {
            movies.sort_by(|a, b| {
                let ordering = compare(a, b, sort.field);
                let ordering = match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                ordering.then(a.movie_id.cmp(&b.movie_id))
            });
        }

        let total = movies.len() as i64;
        let items = movies
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.size as usize)
            .collect();

        Ok(Page { items, total })
    }
}
