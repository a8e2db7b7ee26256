//! Movie models for the API service

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use validator::Validate;

/// Persisted movie row
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Movie {
    pub movie_id: i32,
    pub title: String,
    pub director: String,
    pub studio: String,
    pub movie_cast: Vec<String>,
    pub release_year: i32,
    pub poster: String,
}

/// Movie row before the database assigns an id
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub director: String,
    pub studio: String,
    pub movie_cast: Vec<String>,
    pub release_year: i32,
    pub poster: String,
}

/// Read/write projection of a movie, with the derived poster URL
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MovieDto {
    #[serde(default)]
    pub movie_id: Option<i32>,
    #[validate(length(min = 1, message = "Please provide movie's title"))]
    pub title: String,
    #[validate(length(min = 1, message = "Please provide movie's director"))]
    pub director: String,
    #[validate(length(min = 1, message = "Please provide movie's studio"))]
    pub studio: String,
    #[serde(default)]
    pub movie_cast: Vec<String>,
    #[validate(range(min = 1888, max = 9999, message = "Please provide a valid release year"))]
    pub release_year: i32,
    /// Server-assigned; ignored on input
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
}

/// One page of movies
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePageResponse {
    pub movie_dtos: Vec<MovieDto>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: i64,
    pub total_pages: i64,
    pub is_last: bool,
}

/// An uploaded poster image
#[derive(Debug, Clone)]
pub struct PosterFile {
    /// Client-supplied file name
    pub name: String,
    pub bytes: Bytes,
}

/// Query parameters for paginated listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default)]
    pub page_number: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Query parameters for paginated and sorted listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSortQuery {
    #[serde(default)]
    pub page_number: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_dir")]
    pub dir: String,
}

fn default_page_size() -> u32 {
    10
}

fn default_sort_by() -> String {
    "movieId".to_string()
}

fn default_sort_dir() -> String {
    "asc".to_string()
}

/// Columns a page can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    MovieId,
    Title,
    Director,
    Studio,
    ReleaseYear,
    Poster,
}

impl SortField {
    /// Column name in the `movies` table
    pub fn column(&self) -> &'static str {
        match self {
            SortField::MovieId => "movie_id",
            SortField::Title => "title",
            SortField::Director => "director",
            SortField::Studio => "studio",
            SortField::ReleaseYear => "release_year",
            SortField::Poster => "poster",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movieId" | "movie_id" => Ok(SortField::MovieId),
            "title" => Ok(SortField::Title),
            "director" => Ok(SortField::Director),
            "studio" => Ok(SortField::Studio),
            "releaseYear" | "release_year" => Ok(SortField::ReleaseYear),
            "poster" => Ok(SortField::Poster),
            other => Err(format!("No property '{}' found for type 'Movie'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `"asc"` in any case is ascending, anything else descending
    pub fn parse(dir: &str) -> Self {
        if dir.eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Zero-based page request
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Option<Sort>,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        self.page as i64 * self.size as i64
    }
}

/// A slice of results plus the total number of matching rows
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}
