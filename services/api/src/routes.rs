//! API service routes

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    file_store::content_type_for,
    middleware::{auth_middleware, require_admin},
    models::{
        FileUploadResponse, MessageResponse,
        movie::{MovieDto, PageQuery, PageSortQuery, PosterFile},
    },
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    let admin_routes = Router::new()
        .route("/api/v1/movie/add-movie", post(add_movie))
        .route("/api/v1/movie/update/:movie_id", put(update_movie))
        .route("/api/v1/movie/delete/:movie_id", delete(delete_movie))
        .route("/file/upload", post(upload_file))
        .route_layer(middleware::from_fn(require_admin));

    let protected_routes = Router::new()
        .route("/api/v1/movie/all", get(get_all_movies))
        .route("/api/v1/movie/allMoviesPage", get(get_movies_page))
        .route("/api/v1/movie/allMoviesPageSort", get(get_movies_page_sorted))
        .route("/api/v1/movie/:movie_id", get(get_movie))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/file/:file_name", get(serve_file))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

/// Parts of a movie multipart form
struct MovieForm {
    movie: Option<MovieDto>,
    file: Option<PosterFile>,
}

/// Read the `movieDto` (JSON text) and `file` parts; an empty file counts as absent
async fn read_movie_form(mut multipart: Multipart) -> ApiResult<MovieForm> {
    let mut form = MovieForm {
        movie: None,
        file: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let part = field.name().map(str::to_string);
        match part.as_deref() {
            Some("movieDto") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                let movie = serde_json::from_str::<MovieDto>(&text)
                    .map_err(|e| ApiError::BadRequest(format!("Invalid movieDto: {}", e)))?;
                form.movie = Some(movie);
            }
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                if !bytes.is_empty() {
                    form.file = Some(PosterFile { name, bytes });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

fn missing_movie_part() -> ApiError {
    ApiError::BadRequest("Missing movieDto part".to_string())
}

fn empty_file() -> ApiError {
    ApiError::BadRequest("File is empty! Please send another file".to_string())
}

/// Create a movie from a multipart form with a poster
pub async fn add_movie(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_movie_form(multipart).await?;
    let file = form.file.ok_or_else(empty_file)?;
    let movie = form.movie.ok_or_else(missing_movie_part)?;

    let created = state.movie_service.add_movie(movie, file).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a movie by ID
pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let movie = state.movie_service.get_movie(movie_id).await?;
    Ok(Json(movie))
}

/// Get all movies
pub async fn get_all_movies(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let movies = state.movie_service.get_all_movies().await?;
    Ok(Json(movies))
}

/// Update a movie, optionally replacing its poster
pub async fn update_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i32>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_movie_form(multipart).await?;
    let movie = form.movie.ok_or_else(missing_movie_part)?;

    let updated = state
        .movie_service
        .update_movie(movie_id, movie, form.file)
        .await?;
    Ok(Json(updated))
}

/// Delete a movie and its poster
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.movie_service.delete_movie(movie_id).await?;
    Ok(Json(MessageResponse::new(message)))
}

/// Get one page of movies in natural order
pub async fn get_movies_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .movie_service
        .get_all_movies_with_pagination(query.page_number, query.page_size)
        .await?;
    Ok(Json(page))
}

/// Get one page of movies ordered by `sortBy` / `dir`
pub async fn get_movies_page_sorted(
    State(state): State<AppState>,
    Query(query): Query<PageSortQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .movie_service
        .get_all_movies_with_pagination_and_sorting(
            query.page_number,
            query.page_size,
            &query.sort_by,
            &query.dir,
        )
        .await?;
    Ok(Json(page))
}

/// Store a standalone file in the poster directory
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        if bytes.is_empty() {
            return Err(empty_file());
        }

        let file_name = state.file_store.upload(&name, &bytes).await?;
        info!("Uploaded standalone file {}", file_name);
        return Ok((StatusCode::CREATED, Json(FileUploadResponse { file_name })));
    }

    Err(empty_file())
}

/// Serve a stored poster
pub async fn serve_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.file_store.read(&file_name).await?;
    Ok(([(header::CONTENT_TYPE, content_type_for(&file_name))], bytes))
}
