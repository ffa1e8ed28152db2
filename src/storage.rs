//! Product image storage.
//!
//! Images are written to a Supabase storage bucket when one is configured,
//! otherwise to a local directory served under `/uploads`.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use reqwest::{Client, StatusCode, header};
use thiserror::Error;

use crate::{
    config::{AppConfig, SupabaseConfig},
    error::AppError,
};

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif"];

/// URL prefix under which [`LocalStorage`] files are served.
pub const LOCAL_PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage rejected the request with {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("url does not belong to this store: {0}")]
    ForeignUrl(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// An image file received from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn validate(&self, max_bytes: usize) -> Result<(), AppError> {
        if self.bytes.is_empty() {
            return Err(AppError::bad_request("Image file is empty"));
        }
        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(AppError::bad_request(
                "Only JPEG, PNG and GIF images are allowed",
            ));
        }
        if self.bytes.len() > max_bytes {
            return Err(AppError::bad_request(format!(
                "Image exceeds the {} byte limit",
                max_bytes
            )));
        }
        Ok(())
    }

    /// Object name: upload time in unix millis, then the sanitized client file name.
    pub fn object_name(&self) -> String {
        object_name_at(&self.file_name, Utc::now().timestamp_millis())
    }
}

pub fn object_name_at(file_name: &str, millis: i64) -> String {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let cleaned = if cleaned.is_empty() { "image" } else { cleaned };
    format!("{millis}-{cleaned}")
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores the image under `name` and returns its public URL.
    async fn upload(&self, name: &str, image: &ImageUpload) -> Result<String, StorageError>;

    /// Deletes the object behind a URL previously returned by [`ImageStore::upload`].
    async fn remove(&self, url: &str) -> Result<(), StorageError>;
}

pub fn build_image_store(config: &AppConfig) -> Arc<dyn ImageStore> {
    match &config.supabase {
        Some(supabase) => {
            tracing::info!(bucket = %supabase.bucket, "using supabase image storage");
            Arc::new(SupabaseStorage::new(supabase.clone()))
        }
        None => {
            tracing::info!(dir = %config.upload_dir, "using local image storage");
            Arc::new(LocalStorage::new(&config.upload_dir))
        }
    }
}

pub struct SupabaseStorage {
    http_client: Client,
    config: SupabaseConfig,
}

impl SupabaseStorage {
    pub fn new(config: SupabaseConfig) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http_client,
            config,
        }
    }

    pub fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.url, self.config.bucket, name
        )
    }

    fn object_path<'a>(&self, url: &'a str) -> Option<&'a str> {
        let marker = format!("{}/", self.config.bucket);
        url.split_once(marker.as_str()).map(|(_, path)| path)
    }

    async fn check(response: reqwest::Response) -> Result<(), StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Rejected { status, body })
    }
}

#[async_trait]
impl ImageStore for SupabaseStorage {
    async fn upload(&self, name: &str, image: &ImageUpload) -> Result<String, StorageError> {
        let endpoint = format!(
            "{}/storage/v1/object/{}/{}",
            self.config.url, self.config.bucket, name
        );
        let response = self
            .http_client
            .post(endpoint)
            .bearer_auth(&self.config.key)
            .header("apikey", &self.config.key)
            .header(header::CONTENT_TYPE, &image.content_type)
            .body(image.bytes.clone())
            .send()
            .await?;
        Self::check(response).await?;

        tracing::debug!(object = %name, "image uploaded to supabase");
        Ok(self.public_url(name))
    }

    async fn remove(&self, url: &str) -> Result<(), StorageError> {
        let path = self
            .object_path(url)
            .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))?;
        let endpoint = format!(
            "{}/storage/v1/object/{}",
            self.config.url, self.config.bucket
        );
        let response = self
            .http_client
            .delete(endpoint)
            .bearer_auth(&self.config.key)
            .header("apikey", &self.config.key)
            .json(&serde_json::json!({ "prefixes": [path] }))
            .send()
            .await?;
        Self::check(response).await
    }
}

pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ImageStore for LocalStorage {
    async fn upload(&self, name: &str, image: &ImageUpload) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(name), &image.bytes).await?;
        Ok(format!("{LOCAL_PUBLIC_PREFIX}/{name}"))
    }

    async fn remove(&self, url: &str) -> Result<(), StorageError> {
        let name = url
            .strip_prefix(LOCAL_PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']))
            .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))?;
        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(len: usize) -> ImageUpload {
        ImageUpload {
            file_name: "burger.png".into(),
            content_type: "image/png".into(),
            bytes: Bytes::from(vec![0u8; len]),
        }
    }

    #[test]
    fn rejects_unsupported_types_and_oversized_files() {
        assert!(png(10).validate(1024).is_ok());
        assert!(png(2048).validate(1024).is_err());
        assert!(png(0).validate(1024).is_err());

        let mut pdf = png(10);
        pdf.content_type = "application/pdf".into();
        assert!(pdf.validate(1024).is_err());
    }

    #[test]
    fn object_names_are_prefixed_and_sanitized() {
        assert_eq!(object_name_at("burger.png", 1700), "1700-burger.png");
        assert_eq!(object_name_at("../../etc/passwd", 1), "1-passwd");
        assert_eq!(object_name_at("my photo é.jpg", 5), "5-my_photo__.jpg");
        assert_eq!(object_name_at("", 9), "9-image");
    }

    #[test]
    fn supabase_urls_follow_the_public_object_layout() {
        let store = SupabaseStorage::new(SupabaseConfig {
            url: "https://x.supabase.co".into(),
            key: "k".into(),
            bucket: "menu".into(),
        });
        let url = store.public_url("1-a.png");
        assert_eq!(url, "https://x.supabase.co/storage/v1/object/public/menu/1-a.png");
        assert_eq!(store.object_path(&url), Some("1-a.png"));
        assert_eq!(store.object_path("https://elsewhere/img.png"), None);
    }

    #[tokio::test]
    async fn local_storage_writes_and_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStorage::new(dir.path().join("uploads"));

        let url = store.upload("1-burger.png", &png(4)).await.unwrap();
        assert_eq!(url, "/uploads/1-burger.png");
        assert!(store.root().join("1-burger.png").exists());

        store.remove(&url).await.unwrap();
        assert!(!store.root().join("1-burger.png").exists());

        // removing twice is not an error
        store.remove(&url).await.unwrap();
        assert!(store.remove("/uploads/../secret").await.is_err());
    }
}
