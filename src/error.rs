use axum::{
    Json,
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Failure to reach or query the catalog store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("catalog store is not configured")]
    NotConfigured,
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Media(#[from] object_store::Error),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    /// A query string, path segment or body the extractors could not parse.
    #[error("{1}")]
    Rejected(StatusCode, String),
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Store(StoreError::Db(err))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Multipart(err) => err.status(),
            AppError::Rejected(status, _) => *status,
            AppError::Store(_) | AppError::Media(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Upstream error text is returned to the caller unmodified.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(StoreError::NotConfigured).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let db_err = AppError::from(sea_orm::DbErr::Custom("boom".into()));
        assert!(db_err.to_string().contains("boom"));
        assert_eq!(
            AppError::Rejected(StatusCode::UNPROCESSABLE_ENTITY, "bad".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
