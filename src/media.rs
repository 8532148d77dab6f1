use std::sync::Arc;

use axum::body::Bytes;
use object_store::{ObjectStore, PutPayload, aws::AmazonS3Builder, memory::InMemory, path::Path};
use tracing::{info, warn};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::StoredMedia,
};

/// Pass-through to the object store holding posters and trailers.
#[derive(Clone)]
pub struct MediaStore {
    store: Arc<dyn ObjectStore>,
    bucket: Option<String>,
    public_url: String,
}

impl MediaStore {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: Option<String>, public_url: String) -> Self {
        Self { store, bucket, public_url }
    }

    /// In-process store for local runs and tests.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()), None, "memory://media".to_string())
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let Some(bucket) = config.media_bucket.clone() else {
            warn!("MEDIA_BUCKET not set; using in-memory media store");
            let mut media = Self::in_memory();
            if let Some(url) = &config.media_public_url {
                media.public_url = url.clone();
            }
            return Ok(media);
        };

        let s3 = AmazonS3Builder::from_env().with_bucket_name(&bucket).build()?;
        let public_url = config
            .media_public_url
            .clone()
            .unwrap_or_else(|| format!("https://{bucket}.s3.amazonaws.com"));
        info!(bucket = %bucket, "using S3 media store");
        Ok(Self::new(Arc::new(s3), Some(bucket), public_url))
    }

    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_url.trim_end_matches('/'), key)
    }

    /// Stores `data` under `<category>/<unix millis>-<original name>`.
    pub async fn upload(
        &self,
        category: &str,
        original_name: &str,
        data: Bytes,
    ) -> AppResult<StoredMedia> {
        let category = category.trim();
        if category.is_empty() {
            return Err(AppError::Validation("category is required".to_string()));
        }
        if original_name.trim().is_empty() {
            return Err(AppError::Validation("file name is required".to_string()));
        }

        let millis = jiff::Timestamp::now().as_millisecond();
        let file_name = format!("{millis}-{original_name}");
        let location = Path::from_iter([category, file_name.as_str()]);

        let size = data.len();
        self.store.put(&location, PutPayload::from(data)).await?;

        let key = location.to_string();
        info!(key = %key, size, "media uploaded");
        Ok(StoredMedia { url: self.url_for(&key), key })
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let location =
            Path::parse(key).map_err(|err| AppError::Validation(format!("invalid key: {err}")))?;
        if location.as_ref().is_empty() {
            return Err(AppError::Validation("key is required".to_string()));
        }
        self.store.delete(&location).await?;
        info!(key = %key, "media deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_keys_by_category_and_timestamp() {
        let media = MediaStore::in_memory();
        let stored =
            media.upload("posters", "nexus.jpg", Bytes::from_static(b"jpeg")).await.unwrap();

        let (category, file) = stored.key.split_once('/').unwrap();
        assert_eq!(category, "posters");
        let (millis, name) = file.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(name, "nexus.jpg");
        assert_eq!(stored.url, format!("memory://media/{}", stored.key));

        let location = Path::parse(&stored.key).unwrap();
        let body = media.store.get(&location).await.unwrap().bytes().await.unwrap();
        assert_eq!(body.as_ref(), b"jpeg");
    }

    #[tokio::test]
    async fn delete_removes_exact_key() {
        let media = MediaStore::in_memory();
        let keep = media.upload("trailers", "a.mp4", Bytes::from_static(b"a")).await.unwrap();
        let drop = media.upload("trailers", "b.mp4", Bytes::from_static(b"b")).await.unwrap();

        media.delete(&drop.key).await.unwrap();

        assert!(media.store.head(&Path::parse(&drop.key).unwrap()).await.is_err());
        assert!(media.store.head(&Path::parse(&keep.key).unwrap()).await.is_ok());
    }

    #[tokio::test]
    async fn upload_requires_category_and_name() {
        let media = MediaStore::in_memory();
        let data = Bytes::from_static(b"x");
        let blank_category = media.upload(" ", "a.jpg", data.clone()).await;
        assert!(matches!(blank_category, Err(AppError::Validation(_))));
        assert!(matches!(media.upload("posters", "", data).await, Err(AppError::Validation(_))));
        assert!(matches!(media.delete("").await, Err(AppError::Validation(_))));
    }
}
