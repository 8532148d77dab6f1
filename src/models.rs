use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::entities::movie;

pub const DEFAULT_LIST_LIMIT: u64 = 20;
pub const DEFAULT_TRENDING_LIMIT: u64 = 6;
pub const DEFAULT_RECOMMENDATION_LIMIT: u64 = 4;

/// Genre value that disables genre filtering.
pub const ALL_GENRES: &str = "all";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub genre: String,
    pub rating: Option<f64>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl From<movie::Model> for Movie {
    fn from(row: movie::Model) -> Self {
        Self {
            id: row.id,
            title: row.title,
            year: row.year,
            genre: row.genre,
            rating: row.rating,
            duration: row.duration,
            description: row.description,
            poster_url: row.poster_url,
            trailer_url: row.trailer_url,
            created_at: Timestamp::from_second(row.created_at).ok(),
            updated_at: Timestamp::from_second(row.updated_at).ok(),
        }
    }
}

/// Body of a create request. `title` and `genre` default to empty so that a
/// missing field surfaces as a validation error instead of a body rejection.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewMovie {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub genre: String,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
}

impl From<&Movie> for NewMovie {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            genre: movie.genre.clone(),
            year: movie.year,
            rating: movie.rating,
            duration: movie.duration.clone(),
            description: movie.description.clone(),
            poster_url: movie.poster_url.clone(),
            trailer_url: movie.trailer_url.clone(),
        }
    }
}

impl NewMovie {
    /// Presence check on the two required fields.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        if self.genre.trim().is_empty() {
            return Err("genre is required");
        }
        Ok(())
    }
}

/// Normalized genre/search filter shared by the store query and the
/// in-memory pipeline. Search folds ASCII case only, like SQLite's `lower()`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovieFilter {
    genre: Option<String>,
    search: Option<String>,
}

impl MovieFilter {
    pub fn new(genre: Option<String>, search: Option<String>) -> Self {
        let genre = genre.filter(|g| !g.is_empty() && g != ALL_GENRES);
        let search = search.filter(|s| !s.is_empty());
        Self { genre, search }
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn matches(&self, movie: &Movie) -> bool {
        if let Some(genre) = self.genre() {
            if movie.genre != genre {
                return false;
            }
        }
        if let Some(term) = self.search() {
            let term = term.to_ascii_lowercase();
            let in_title = movie.title.to_ascii_lowercase().contains(&term);
            let in_description = movie
                .description
                .as_ref()
                .is_some_and(|d| d.to_ascii_lowercase().contains(&term));
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

/// Largest row count or offset a store query can bind.
pub const MAX_ROWS: u64 = i64::MAX as u64;

impl Page {
    /// Both values are clamped to `MAX_ROWS`; anything larger already covers
    /// every row, so results are unchanged.
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit: limit.min(MAX_ROWS), offset: offset.min(MAX_ROWS) }
    }

    /// One-based page number. A zero limit counts as one to keep the division defined.
    pub fn number(&self) -> u64 {
        self.offset / self.limit.max(1) + 1
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub genre: Option<String>,
    pub search: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self { genre: None, search: None, limit: DEFAULT_LIST_LIMIT, offset: 0 }
    }
}

impl ListParams {
    pub fn into_parts(self) -> (MovieFilter, Page) {
        (MovieFilter::new(self.genre, self.search), Page::new(self.limit, self.offset))
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TrendingParams {
    pub limit: u64,
}

impl Default for TrendingParams {
    fn default() -> Self {
        Self { limit: DEFAULT_TRENDING_LIMIT }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecommendationParams {
    pub limit: u64,
}

impl Default for RecommendationParams {
    fn default() -> Self {
        Self { limit: DEFAULT_RECOMMENDATION_LIMIT }
    }
}

/// `total` is the size of the returned page, not the number of matching rows.
#[derive(Clone, Debug, Serialize)]
pub struct MovieList {
    pub movies: Vec<Movie>,
    pub total: usize,
    pub page: u64,
    pub limit: u64,
}

impl MovieList {
    pub fn new(movies: Vec<Movie>, page: Page) -> Self {
        Self { total: movies.len(), page: page.number(), limit: page.limit, movies }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub recommendations: Vec<Movie>,
    pub based_on: String,
    pub genre: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CreatedMovie {
    pub id: i32,
    pub message: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct StoredMedia {
    pub key: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_genre_sentinel_disables_genre_filter() {
        let filter = MovieFilter::new(Some("all".into()), None);
        assert_eq!(filter.genre(), None);

        let filter = MovieFilter::new(Some("".into()), Some("".into()));
        assert_eq!(filter, MovieFilter::default());
    }

    #[test]
    fn page_number_is_one_based() {
        assert_eq!(Page::new(20, 0).number(), 1);
        assert_eq!(Page::new(20, 19).number(), 1);
        assert_eq!(Page::new(20, 40).number(), 3);
        assert_eq!(Page::new(0, 5).number(), 6);
    }

    #[test]
    fn page_clamps_to_bindable_range() {
        let page = Page::new(u64::MAX, u64::MAX);
        assert_eq!(page.limit, MAX_ROWS);
        assert_eq!(page.offset, MAX_ROWS);
        assert_eq!(page.number(), 2);
    }

    #[test]
    fn list_total_counts_returned_rows_only() {
        let list = MovieList::new(Vec::new(), Page::new(5, 10));
        assert_eq!(list.total, 0);
        assert_eq!(list.page, 3);
        assert_eq!(list.limit, 5);
    }
}
