//! Movie catalog orchestration
//!
//! Combines the movie repository with the poster file store. The two writes
//! are not transactional: on create and update a failed row write removes the
//! freshly stored poster, but concurrent updates/deletes of the same movie can
//! still race.

use std::sync::Arc;
use tracing::{error, info, warn};
use validator::Validate;

use crate::{
    error::{ApiError, ApiResult},
    file_store::{FileStore, FileStoreError},
    models::movie::{
        Movie, MovieDto, MoviePageResponse, NewMovie, PageRequest, PosterFile, Sort,
        SortDirection, SortField,
    },
    repositories::MovieRepository,
};

/// Movie service
#[derive(Clone)]
pub struct MovieService {
    repository: Arc<dyn MovieRepository>,
    file_store: FileStore,
    base_url: String,
}

impl MovieService {
    /// `base_url` is the public origin poster URLs are built from
    pub fn new(
        repository: Arc<dyn MovieRepository>,
        file_store: FileStore,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            repository,
            file_store,
            base_url,
        }
    }

    fn poster_url(&self, poster: &str) -> String {
        format!("{}/file/{}", self.base_url, poster)
    }

    fn to_dto(&self, movie: Movie) -> MovieDto {
        let poster_url = self.poster_url(&movie.poster);
        MovieDto {
            movie_id: Some(movie.movie_id),
            title: movie.title,
            director: movie.director,
            studio: movie.studio,
            movie_cast: movie.movie_cast,
            release_year: movie.release_year,
            poster: Some(movie.poster),
            poster_url: Some(poster_url),
        }
    }

    async fn find_existing(&self, movie_id: i32) -> ApiResult<Movie> {
        self.repository
            .find_by_id(movie_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Movie Not Found with id = {}", movie_id)))
    }

    /// Store the poster, then persist the movie pointing at it
    pub async fn add_movie(&self, movie: MovieDto, file: PosterFile) -> ApiResult<MovieDto> {
        movie.validate()?;

        let file_name = FileStore::sanitize(&file.name)?;
        if self.file_store.exists(&file_name).await? {
            return Err(ApiError::Conflict(
                "File already exists! Please enter another file name".to_string(),
            ));
        }
        let poster = self.file_store.upload(&file_name, &file.bytes).await?;

        let new_movie = NewMovie {
            title: movie.title,
            director: movie.director,
            studio: movie.studio,
            movie_cast: movie.movie_cast,
            release_year: movie.release_year,
            poster: poster.clone(),
        };

        let saved = match self.repository.insert(&new_movie).await {
            Ok(saved) => saved,
            Err(e) => {
                if let Err(cleanup) = self.file_store.delete_if_exists(&poster).await {
                    error!("Failed to remove orphaned poster {}: {}", poster, cleanup);
                }
                return Err(e.into());
            }
        };

        info!("Created movie {} with poster {}", saved.movie_id, saved.poster);
        Ok(self.to_dto(saved))
    }

    pub async fn get_movie(&self, movie_id: i32) -> ApiResult<MovieDto> {
        let movie = self.find_existing(movie_id).await?;
        Ok(self.to_dto(movie))
    }

    pub async fn get_all_movies(&self) -> ApiResult<Vec<MovieDto>> {
        let movies = self.repository.find_all().await?;
        Ok(movies.into_iter().map(|m| self.to_dto(m)).collect())
    }

    /// Overwrite a movie's fields, replacing its poster when a file is given
    ///
    /// The new poster is stored before the row is written and removed again if
    /// the row write fails. The old poster is deleted only once the row points
    /// at the new one. A missing old poster aborts the update up front.
    pub async fn update_movie(
        &self,
        movie_id: i32,
        movie: MovieDto,
        file: Option<PosterFile>,
    ) -> ApiResult<MovieDto> {
        movie.validate()?;
        let existing = self.find_existing(movie_id).await?;

        let mut updated = Movie {
            movie_id: existing.movie_id,
            title: movie.title,
            director: movie.director,
            studio: movie.studio,
            movie_cast: movie.movie_cast,
            release_year: movie.release_year,
            poster: existing.poster.clone(),
        };

        let Some(file) = file else {
            let saved = self.repository.update(&updated).await?;
            info!("Updated movie {}", saved.movie_id);
            return Ok(self.to_dto(saved));
        };

        let file_name = FileStore::sanitize(&file.name)?;
        let same_name = file_name == existing.poster;
        if !same_name && self.file_store.exists(&file_name).await? {
            return Err(ApiError::Conflict(
                "File already exists! Please enter another file name".to_string(),
            ));
        }
        if !self.file_store.exists(&existing.poster).await? {
            return Err(FileStoreError::NotFound(existing.poster.clone()).into());
        }

        // Same name: keep the old bytes so a failed row write can put them back
        let previous = if same_name {
            let bytes = self.file_store.read(&existing.poster).await?;
            self.file_store.delete(&existing.poster).await?;
            Some(bytes)
        } else {
            None
        };

        updated.poster = match self.file_store.upload(&file_name, &file.bytes).await {
            Ok(poster) => poster,
            Err(e) => {
                self.restore_poster(&existing.poster, previous.as_deref())
                    .await;
                return Err(e.into());
            }
        };

        let saved = match self.repository.update(&updated).await {
            Ok(saved) => saved,
            Err(e) => {
                if let Err(cleanup) = self.file_store.delete_if_exists(&updated.poster).await {
                    error!(
                        "Failed to remove orphaned poster {}: {}",
                        updated.poster, cleanup
                    );
                }
                self.restore_poster(&existing.poster, previous.as_deref())
                    .await;
                return Err(e.into());
            }
        };

        if previous.is_none() {
            if let Err(e) = self.file_store.delete(&existing.poster).await {
                error!(
                    "Movie {} now uses {} but old poster {} could not be removed: {}",
                    saved.movie_id, saved.poster, existing.poster, e
                );
            }
        }

        info!("Updated movie {} with poster {}", saved.movie_id, saved.poster);
        Ok(self.to_dto(saved))
    }

    async fn restore_poster(&self, name: &str, bytes: Option<&[u8]>) {
        let Some(bytes) = bytes else { return };
        if let Err(e) = self.file_store.upload(name, bytes).await {
            error!("Failed to restore poster {}: {}", name, e);
        }
    }

    /// Remove the poster (best effort) and then the row
    pub async fn delete_movie(&self, movie_id: i32) -> ApiResult<String> {
        let existing = self.find_existing(movie_id).await?;

        match self.file_store.delete_if_exists(&existing.poster).await {
            Ok(true) => {}
            Ok(false) => warn!(
                "Poster {} for movie {} was already missing",
                existing.poster, movie_id
            ),
            Err(e) => warn!(
                "Ignoring failure to delete poster {} for movie {}: {}",
                existing.poster, movie_id, e
            ),
        }

        if !self.repository.delete(existing.movie_id).await? {
            return Err(ApiError::NotFound(format!(
                "Movie Not Found with id = {}",
                movie_id
            )));
        }

        info!("Deleted movie {}", movie_id);
        Ok(format!("Movie deleted with id = {}", existing.movie_id))
    }

    pub async fn get_all_movies_with_pagination(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> ApiResult<MoviePageResponse> {
        self.page(PageRequest {
            page: page_number,
            size: page_size,
            sort: None,
        })
        .await
    }

    /// `dir` is `"asc"` in any case for ascending, anything else descending
    pub async fn get_all_movies_with_pagination_and_sorting(
        &self,
        page_number: u32,
        page_size: u32,
        sort_by: &str,
        dir: &str,
    ) -> ApiResult<MoviePageResponse> {
        let field: SortField = sort_by.parse().map_err(ApiError::BadRequest)?;
        self.page(PageRequest {
            page: page_number,
            size: page_size,
            sort: Some(Sort {
                field,
                direction: SortDirection::parse(dir),
            }),
        })
        .await
    }

    async fn page(&self, request: PageRequest) -> ApiResult<MoviePageResponse> {
        if request.size == 0 {
            return Err(ApiError::BadRequest(
                "Page size must be greater than zero".to_string(),
            ));
        }

        let page = self.repository.find_page(&request).await?;
        let size = request.size as i64;
        let total_pages = (page.total + size - 1) / size;

        Ok(MoviePageResponse {
            movie_dtos: page.items.into_iter().map(|m| self.to_dto(m)).collect(),
            page_number: request.page,
            page_size: request.size,
            total_elements: page.total,
            total_pages,
            is_last: request.page as i64 + 1 >= total_pages,
        })
    }
}
