use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    error::{AppError, AppResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    models::{
        CreatedMovie, ListParams, Movie, MovieList, NewMovie, RecommendationParams,
        Recommendations, StoredMedia, TrendingParams,
    },
};

pub fn router(state: Arc<AppState>) -> Router {
    let mut movies = get(list_movies);
    if state.catalog.store().is_configured() {
        movies = movies.post(create_movie);
    }

    Router::new()
        .route("/api/health", get(health))
        .route("/api/movies", movies)
        .route("/api/movies/trending", get(trending))
        .route("/api/movies/{id}", get(get_movie))
        .route("/api/movies/{id}/recommendations", get(recommendations))
        .route("/api/genres", get(genres))
        .route(
            "/api/upload/{category}",
            post(upload_media).layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/api/media/{*key}", delete(delete_media))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let connected = state.catalog.store().is_connected().await;
    Json(json!({
        "status": "ok",
        "database": if connected { "connected" } else { "disconnected" },
        "bucket": state.media.bucket(),
        "timestamp": jiff::Timestamp::now(),
    }))
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Json<MovieList> {
    let (filter, page) = params.into_parts();
    Json(state.catalog.list(&filter, page).await)
}

pub async fn trending(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<TrendingParams>,
) -> Json<Vec<Movie>> {
    Json(state.catalog.trending(params.limit).await)
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<Movie>> {
    Ok(Json(state.catalog.get(id).await?))
}

pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    ApiPath(movie_id): ApiPath<i32>,
    ApiQuery(params): ApiQuery<RecommendationParams>,
) -> AppResult<Json<Recommendations>> {
    Ok(Json(state.catalog.recommendations(movie_id, params.limit).await?))
}

pub async fn genres(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.catalog.genres().await)
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    ApiJson(new): ApiJson<NewMovie>,
) -> AppResult<(StatusCode, Json<CreatedMovie>)> {
    let id = state.catalog.create(&new).await?;
    Ok((StatusCode::CREATED, Json(CreatedMovie { id, message: "Movie created" })))
}

/// Expects the payload in a multipart field named `file`.
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    ApiPath(category): ApiPath<String>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<StoredMedia>)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        let stored = state.media.upload(&category, &name, data).await?;
        return Ok((StatusCode::CREATED, Json(stored)));
    }
    Err(AppError::Validation("file is required".to_string()))
}

pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    ApiPath(key): ApiPath<String>,
) -> AppResult<Json<Value>> {
    state.media.delete(&key).await?;
    Ok(Json(json!({ "deleted": key })))
}
