mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod extract;
mod media;
mod models;
mod query;
mod routes;
mod seed;
mod store;

use std::sync::Arc;

use crate::{catalog::Catalog, config::Config, media::MediaStore, store::CatalogStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Catalog,
    pub media: MediaStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,marquee=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let store = CatalogStore::new(config.database_url.clone());
    if store.is_configured() {
        if let Err(err) = store.connection().await {
            tracing::warn!(
                error = %err,
                "catalog store unavailable at startup; will retry on first use"
            );
        }
    } else {
        tracing::warn!("DATABASE_URL is empty; serving the built-in sample catalog read-only");
    }

    let media = MediaStore::from_config(&config)?;
    let catalog = Catalog::new(store.clone());

    let state = Arc::new(AppState { config: config.clone(), catalog, media });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutting down");
}
