use std::sync::Arc;

use sea_orm::{
    ActiveValue::NotSet,
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    sea_query::{Alias, Expr, Func, LikeExpr, NullOrdering, SimpleExpr},
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    db,
    entities::movie,
    error::StoreError,
    models::{Movie, MovieFilter, NewMovie, Page},
};

const LIKE_ESCAPE: char = '!';
const ASCII_UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ASCII_LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

/// Handle to the catalog store. The connection is acquired at startup and,
/// if that fails, again on first use; `close` releases it at shutdown.
#[derive(Clone)]
pub struct CatalogStore {
    url: Option<Arc<str>>,
    conn: Arc<Mutex<Option<DatabaseConnection>>>,
}

impl CatalogStore {
    pub fn new(url: Option<String>) -> Self {
        Self { url: url.map(Arc::from), conn: Arc::new(Mutex::new(None)) }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    pub async fn connection(&self) -> Result<DatabaseConnection, StoreError> {
        let Some(url) = self.url.as_deref() else {
            return Err(StoreError::NotConfigured);
        };

        let mut conn = self.conn.lock().await;
        if let Some(db) = conn.as_ref() {
            return Ok(db.clone());
        }

        let db = db::connect_and_migrate(url).await?;
        info!("catalog store connected");
        *conn = Some(db.clone());
        Ok(db)
    }

    /// Pings an already acquired connection. Never opens a new one and never
    /// waits: while another caller holds the handle (for example a slow first
    /// connect), the store reports as disconnected.
    pub async fn is_connected(&self) -> bool {
        let db = match self.conn.try_lock() {
            Ok(conn) => conn.clone(),
            Err(_) => return false,
        };
        match db {
            Some(db) => db.ping().await.is_ok(),
            None => false,
        }
    }

    pub async fn close(&self) {
        let Some(db) = self.conn.lock().await.take() else {
            return;
        };
        match db.close().await {
            Ok(()) => info!("catalog store connection closed"),
            Err(err) => warn!(error = %err, "failed to close catalog store connection"),
        }
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        let db = self.connection().await?;
        Ok(movie::Entity::find().count(&db).await?)
    }

    pub async fn list(&self, filter: &MovieFilter, page: Page) -> Result<Vec<Movie>, StoreError> {
        let db = self.connection().await?;
        let rows = ranked(filtered(filter, db.get_database_backend()))
            .limit(page.limit)
            .offset(page.offset)
            .all(&db)
            .await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    pub async fn find(&self, id: i32) -> Result<Option<Movie>, StoreError> {
        let db = self.connection().await?;
        Ok(movie::Entity::find_by_id(id).one(&db).await?.map(Movie::from))
    }

    pub async fn trending(&self, limit: u64) -> Result<Vec<Movie>, StoreError> {
        self.list(&MovieFilter::default(), Page::new(limit, 0)).await
    }

    pub async fn same_genre(&self, base: &Movie, limit: u64) -> Result<Vec<Movie>, StoreError> {
        let db = self.connection().await?;
        let rows = ranked(movie::Entity::find())
            .filter(movie::Column::Genre.eq(base.genre.as_str()))
            .filter(movie::Column::Id.ne(base.id))
            .limit(Page::new(limit, 0).limit)
            .all(&db)
            .await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    pub async fn distinct_genres(&self) -> Result<Vec<String>, StoreError> {
        let db = self.connection().await?;
        let genres = movie::Entity::find()
            .select_only()
            .column(movie::Column::Genre)
            .distinct()
            .order_by_asc(movie::Column::Genre)
            .into_tuple::<String>()
            .all(&db)
            .await?;
        Ok(genres)
    }

    pub async fn insert(&self, new: &NewMovie) -> Result<i32, StoreError> {
        let db = self.connection().await?;
        let row = new_row(new, jiff::Timestamp::now().as_second());
        let res = movie::Entity::insert(row).exec(&db).await?;
        Ok(res.last_insert_id)
    }
}

pub fn new_row(new: &NewMovie, now: i64) -> movie::ActiveModel {
    movie::ActiveModel {
        id: NotSet,
        title: Set(new.title.clone()),
        year: Set(new.year),
        genre: Set(new.genre.clone()),
        rating: Set(new.rating),
        duration: Set(new.duration.clone()),
        description: Set(new.description.clone()),
        poster_url: Set(new.poster_url.clone()),
        trailer_url: Set(new.trailer_url.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Store-side equivalent of `MovieFilter::matches`.
pub fn filtered(filter: &MovieFilter, backend: DbBackend) -> Select<movie::Entity> {
    let mut select = movie::Entity::find();

    if let Some(genre) = filter.genre() {
        select = select.filter(movie::Column::Genre.eq(genre));
    }

    if let Some(term) = filter.search() {
        let pattern = format!("%{}%", escape_like(&term.to_ascii_lowercase()));
        let contains = |col: movie::Column| {
            Expr::expr(ascii_lower(col, backend))
                .like(LikeExpr::new(pattern.clone()).escape(LIKE_ESCAPE))
        };
        select = select.filter(
            Condition::any()
                .add(contains(movie::Column::Title))
                .add(contains(movie::Column::Description)),
        );
    }

    select
}

/// Lowercases ASCII letters only. SQLite's `lower()` already does exactly
/// that; Postgres folds Unicode in `lower()`, so it gets `translate()`.
fn ascii_lower(col: movie::Column, backend: DbBackend) -> SimpleExpr {
    let col = Expr::col((movie::Entity, col));
    match backend {
        DbBackend::Postgres => Func::cust(Alias::new("translate"))
            .arg(col)
            .arg(ASCII_UPPER)
            .arg(ASCII_LOWER)
            .into(),
        _ => Func::lower(col).into(),
    }
}

/// Store-side equivalent of `query::by_rating_desc`.
pub fn ranked(select: Select<movie::Entity>) -> Select<movie::Entity> {
    select
        .order_by_with_nulls(movie::Column::Rating, Order::Desc, NullOrdering::Last)
        .order_by_asc(movie::Column::Id)
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}
