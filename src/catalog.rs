//! Query resolution over the catalog store with fallback to the static seed set.
//!
//! Read operations try the store first. Any store failure is logged and the
//! same result is recomputed in memory over the seed set, so callers never see
//! which source answered. Writes go to the store only.

use tracing::{debug, warn};

use crate::{
    error::{AppError, AppResult, StoreError},
    models::{Movie, MovieFilter, MovieList, NewMovie, Page, Recommendations},
    query, seed,
    store::CatalogStore,
};

#[derive(Clone)]
pub struct Catalog {
    store: CatalogStore,
    seed: &'static [Movie],
}

fn fall_back(op: &'static str, err: &StoreError) {
    warn!(op, error = %err, "catalog store unavailable, serving seed set");
}

impl Catalog {
    pub fn new(store: CatalogStore) -> Self {
        Self { store, seed: seed::movies() }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Filtered, rating-ordered page of movies. An empty store counts as
    /// unavailable.
    pub async fn list(&self, filter: &MovieFilter, page: Page) -> MovieList {
        let from_store = async {
            if self.store.count().await? == 0 {
                return Ok(None);
            }
            self.store.list(filter, page).await.map(Some)
        };

        let movies = match from_store.await {
            Ok(Some(movies)) => movies,
            Ok(None) => {
                debug!("catalog store is empty, serving seed set");
                query::apply(self.seed, filter, page)
            },
            Err(err) => {
                fall_back("list", &err);
                query::apply(self.seed, filter, page)
            },
        };

        MovieList::new(movies, page)
    }

    /// A reachable store answering with no row is a plain not-found; the seed
    /// set is only consulted when the store cannot be queried at all.
    pub async fn get(&self, id: i32) -> AppResult<Movie> {
        let found = match self.store.find(id).await {
            Ok(found) => found,
            Err(err) => {
                fall_back("get", &err);
                query::find(self.seed, id).cloned()
            },
        };
        found.ok_or_else(movie_not_found)
    }

    pub async fn trending(&self, limit: u64) -> Vec<Movie> {
        match self.store.trending(limit).await {
            Ok(movies) if !movies.is_empty() => movies,
            Ok(_) => query::trending(self.seed, limit),
            Err(err) => {
                fall_back("trending", &err);
                query::trending(self.seed, limit)
            },
        }
    }

    pub async fn recommendations(&self, movie_id: i32, limit: u64) -> AppResult<Recommendations> {
        let from_store = async {
            let Some(base) = self.store.find(movie_id).await? else {
                return Ok(None);
            };
            let recommendations = self.store.same_genre(&base, limit).await?;
            Ok::<_, StoreError>(Some((base, recommendations)))
        };

        let resolved = match from_store.await {
            Ok(resolved) => resolved,
            Err(err) => {
                fall_back("recommendations", &err);
                query::find(self.seed, movie_id)
                    .map(|base| (base.clone(), query::same_genre(self.seed, base, limit)))
            },
        };

        let (base, recommendations) = resolved.ok_or_else(movie_not_found)?;
        Ok(Recommendations { recommendations, based_on: base.title, genre: base.genre })
    }

    pub async fn genres(&self) -> Vec<String> {
        match self.store.distinct_genres().await {
            Ok(genres) if !genres.is_empty() => genres,
            Ok(_) => query::distinct_genres(self.seed),
            Err(err) => {
                fall_back("genres", &err);
                query::distinct_genres(self.seed)
            },
        }
    }

    /// Inserts a movie. Validation happens before the store is touched.
    pub async fn create(&self, new: &NewMovie) -> AppResult<i32> {
        new.validate().map_err(|msg| AppError::Validation(msg.to_string()))?;
        let id = self.store.insert(new).await?;
        debug!(id, title = %new.title, "movie created");
        Ok(id)
    }
}

fn movie_not_found() -> AppError {
    AppError::NotFound("Movie not found".to_string())
}

#[cfg(test)]
mod tests {
    use sea_orm::EntityTrait;

    use super::*;
    use crate::{entities::movie, store::tests::seeded_store};

    fn offline() -> Catalog {
        Catalog::new(CatalogStore::new(None))
    }

    fn unreachable() -> Catalog {
        Catalog::new(CatalogStore::new(Some(
            "sqlite:///nonexistent-marquee-dir/catalog.db".to_string(),
        )))
    }

    async fn emptied() -> Catalog {
        let store = seeded_store().await;
        let db = store.connection().await.unwrap();
        movie::Entity::delete_many().exec(&db).await.unwrap();
        Catalog::new(store)
    }

    fn titles(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[tokio::test]
    async fn list_falls_back_to_seed_when_store_unreachable() {
        for catalog in [offline(), unreachable()] {
            let filter = MovieFilter::new(Some("action".into()), None);
            let list = catalog.list(&filter, Page::new(20, 0)).await;
            assert_eq!(titles(&list.movies), vec!["Shadow Protocol", "Neon Nights"]);
            assert_eq!(list.total, 2);
            assert_eq!(list.page, 1);
            assert_eq!(list.limit, 20);
        }
    }

    #[tokio::test]
    async fn list_search_finds_galaxy() {
        let catalog = offline();
        let filter = MovieFilter::new(None, Some("galaxy".into()));
        let list = catalog.list(&filter, Page::new(20, 0)).await;
        assert_eq!(titles(&list.movies), vec!["Cosmic Comedy Club"]);
    }

    #[tokio::test]
    async fn list_total_is_page_size() {
        let catalog = Catalog::new(seeded_store().await);
        let list = catalog.list(&MovieFilter::default(), Page::new(2, 4)).await;
        assert_eq!(list.total, 2);
        assert_eq!(list.page, 3);
        assert!(list.movies.iter().all(|m| m.created_at.is_some()));
    }

    #[tokio::test]
    async fn list_uses_seed_when_store_is_empty() {
        let catalog = emptied().await;
        let list = catalog.list(&MovieFilter::default(), Page::new(20, 0)).await;
        assert_eq!(list.movies.len(), 6);
        assert!(list.movies.iter().all(|m| m.created_at.is_none()));
    }

    #[tokio::test]
    async fn get_misses_in_reachable_store_do_not_consult_seed() {
        let catalog = emptied().await;
        assert!(matches!(catalog.get(1).await, Err(AppError::NotFound(_))));

        let catalog = offline();
        assert_eq!(catalog.get(1).await.unwrap().title, "Quantum Nexus");
        assert!(matches!(catalog.get(99).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn trending_returns_top_three() {
        for catalog in [offline(), Catalog::new(seeded_store().await)] {
            let got = catalog.trending(3).await;
            assert_eq!(titles(&got), vec!["Quantum Nexus", "The Last Symphony", "Digital Phantom"]);
        }
    }

    #[tokio::test]
    async fn recommendations_for_lone_genre_are_empty() {
        let recs = offline().recommendations(1, 4).await.unwrap();
        assert!(recs.recommendations.is_empty());
        assert_eq!(recs.based_on, "Quantum Nexus");
        assert_eq!(recs.genre, "sci-fi");
    }

    #[tokio::test]
    async fn recommendations_from_store_share_genre() {
        let catalog = Catalog::new(seeded_store().await);
        let recs = catalog.recommendations(3, 4).await.unwrap();
        assert_eq!(titles(&recs.recommendations), vec!["Neon Nights"]);
        assert_eq!(recs.based_on, "Shadow Protocol");

        assert!(matches!(catalog.recommendations(42, 4).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn genres_are_distinct_and_sorted() {
        for catalog in [offline(), emptied().await] {
            assert_eq!(
                catalog.genres().await,
                vec!["action", "comedy", "drama", "sci-fi", "thriller"]
            );
        }
    }

    #[tokio::test]
    async fn create_with_empty_title_does_not_touch_store() {
        let catalog = Catalog::new(seeded_store().await);
        let new = NewMovie { title: "  ".into(), genre: "drama".into(), ..Default::default() };
        assert!(matches!(catalog.create(&new).await, Err(AppError::Validation(_))));
        assert_eq!(catalog.store().count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn create_without_store_is_an_upstream_error() {
        let new = NewMovie { title: "Orbit".into(), genre: "sci-fi".into(), ..Default::default() };
        assert!(matches!(unreachable().create(&new).await, Err(AppError::Store(_))));
    }

    #[tokio::test]
    async fn created_movie_is_listed_and_recommended() {
        let catalog = Catalog::new(seeded_store().await);
        let new = NewMovie {
            title: "Orbit".into(),
            genre: "sci-fi".into(),
            rating: Some(4.9),
            ..Default::default()
        };
        let id = catalog.create(&new).await.unwrap();

        assert_eq!(catalog.trending(1).await[0].id, id);
        let recs = catalog.recommendations(1, 4).await.unwrap();
        assert_eq!(titles(&recs.recommendations), vec!["Orbit"]);
    }
}
