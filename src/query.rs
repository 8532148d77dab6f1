//! In-memory filter, order and paginate pipeline used when the catalog store
//! cannot answer. Every function here mirrors a query in `store.rs` and must
//! return the same movies for the same inputs.

use std::cmp::Ordering;

use crate::models::{Movie, MovieFilter, Page};

/// Rating descending, unrated movies last, id ascending between equal ratings.
pub fn by_rating_desc(a: &Movie, b: &Movie) -> Ordering {
    let rating = match (a.rating, b.rating) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    rating.then_with(|| a.id.cmp(&b.id))
}

pub fn rank<'a>(movies: impl IntoIterator<Item = &'a Movie>) -> Vec<Movie> {
    let mut out: Vec<Movie> = movies.into_iter().cloned().collect();
    out.sort_by(by_rating_desc);
    out
}

fn paginate(movies: Vec<Movie>, page: Page) -> Vec<Movie> {
    let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
    movies.into_iter().skip(offset).take(limit).collect()
}

pub fn apply(movies: &[Movie], filter: &MovieFilter, page: Page) -> Vec<Movie> {
    let ranked = rank(movies.iter().filter(|m| filter.matches(m)));
    paginate(ranked, page)
}

pub fn trending(movies: &[Movie], limit: u64) -> Vec<Movie> {
    apply(movies, &MovieFilter::default(), Page::new(limit, 0))
}

pub fn find(movies: &[Movie], id: i32) -> Option<&Movie> {
    movies.iter().find(|m| m.id == id)
}

/// Movies sharing `base`'s genre, excluding `base` itself.
pub fn same_genre(movies: &[Movie], base: &Movie, limit: u64) -> Vec<Movie> {
    let ranked = rank(movies.iter().filter(|m| m.genre == base.genre && m.id != base.id));
    paginate(ranked, Page::new(limit, 0))
}

pub fn distinct_genres(movies: &[Movie]) -> Vec<String> {
    let mut genres: Vec<String> = movies.iter().map(|m| m.genre.clone()).collect();
    genres.sort();
    genres.dedup();
    genres
}
