use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    PaginatorTrait, Statement, TransactionTrait,
};
use tracing::info;

use crate::{entities::movie, models::NewMovie, seed, store::new_row};

const SQLITE_PRAGMAS: [&str; 2] = ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"];

/// Opens the single shared connection, brings the schema up to date and seeds
/// an empty catalog.
pub async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(database_url);
    opts.max_connections(1).min_connections(1);
    let db = Database::connect(opts).await?;

    if db.get_database_backend() == DbBackend::Sqlite {
        for pragma in SQLITE_PRAGMAS {
            db.execute(Statement::from_string(DbBackend::Sqlite, pragma.to_string())).await?;
        }
    }

    Migrator::up(&db, None).await?;
    seed_if_empty(&db).await?;
    Ok(db)
}

/// Inserts the static seed set when the movies table has no rows. Returns the
/// number of rows inserted.
pub async fn seed_if_empty(db: &DatabaseConnection) -> Result<usize, DbErr> {
    if movie::Entity::find().count(db).await? > 0 {
        return Ok(0);
    }

    let now = jiff::Timestamp::now().as_second();
    let rows = seed::movies().iter().map(|m| new_row(&NewMovie::from(m), now));

    let txn = db.begin().await?;
    for row in rows {
        movie::Entity::insert(row).exec(&txn).await?;
    }
    txn.commit().await?;

    let inserted = seed::movies().len();
    info!(rows = inserted, "seeded empty catalog");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use sea_orm::QueryOrder;

    use super::*;

    #[tokio::test]
    async fn empty_store_is_seeded_once() {
        let db = connect_and_migrate("sqlite::memory:").await.unwrap();

        let rows = movie::Entity::find()
            .order_by_asc(movie::Column::Id)
            .all(&db)
            .await
            .unwrap();
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        let expected: Vec<&str> = seed::movies().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, expected);
        assert!(rows.iter().all(|r| r.created_at > 0 && r.created_at == r.updated_at));

        assert_eq!(seed_if_empty(&db).await.unwrap(), 0);
        assert_eq!(movie::Entity::find().count(&db).await.unwrap(), 6);
    }
}
