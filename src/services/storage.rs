// src/services/storage.rs

//! Object storage for vehicle images and documents.
//!
//! Production uses an S3-compatible bucket (DigitalOcean Spaces). Every object
//! is written with a private ACL and read back through presigned GET URLs.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
    time::Duration,
};

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{BehaviorVersion, Credentials, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
    types::ObjectCannedAcl,
    Client,
};
use chrono::Utc;
use uuid::Uuid;

use crate::common::error::AppError;

pub const IMAGE_PREFIX: &str = "vehicles/images";
pub const DOCUMENT_PREFIX: &str = "vehicles/documents";

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

pub const DEFAULT_PRESIGN_TTL_SECS: u64 = 3600;
pub const MAX_PRESIGN_TTL_SECS: u64 = 7 * 24 * 3600;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    async fn presigned_get(&self, key: &str, ttl: Duration) -> Result<String, AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

/// Caller TTL, defaulting to an hour and capped at a week.
pub fn presign_ttl(requested_secs: Option<u64>) -> Duration {
    let secs = requested_secs
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_PRESIGN_TTL_SECS)
        .min(MAX_PRESIGN_TTL_SECS);
    Duration::from_secs(secs)
}

pub fn is_allowed_image(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type.trim().to_ascii_lowercase().as_str())
}

fn extension_for(original_name: &str, content_type: &str) -> String {
    let from_name = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.unwrap_or_else(|| {
        match content_type {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "application/pdf" => "pdf",
            _ => "bin",
        }
        .to_string()
    })
}

/// `<prefix>/<uuid>_<unix>.<ext>`
pub fn object_key(prefix: &str, original_name: &str, content_type: &str) -> String {
    format!(
        "{}/{}_{}.{}",
        prefix,
        Uuid::new_v4(),
        Utc::now().timestamp(),
        extension_for(original_name, content_type)
    )
}

// =============================================================================
//  SPACES (S3)
// =============================================================================

#[derive(Debug, Clone)]
pub struct SpacesConfig {
    pub key: String,
    pub secret: String,
    pub region: String,
    pub bucket: String,
    pub endpoint: Option<String>,
}

impl SpacesConfig {
    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}.digitaloceanspaces.com", self.region))
    }
}

pub struct SpacesStore {
    client: Client,
    bucket: String,
}

impl SpacesStore {
    pub fn new(config: &SpacesConfig) -> Self {
        let credentials = Credentials::new(&config.key, &config.secret, None, None, "spaces");
        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint_url())
            .credentials_provider(credentials)
            .force_path_style(false)
            .build();

        tracing::info!(bucket = %config.bucket, region = %config.region, "object storage initialised");

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for SpacesStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .acl(ObjectCannedAcl::Private)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("failed to upload '{}': {}", key, e)))?;

        Ok(())
    }

    async fn presigned_get(&self, key: &str, ttl: Duration) -> Result<String, AppError> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| AppError::Storage(format!("invalid presign window: {}", e)))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::Storage(format!("failed to presign '{}': {}", key, e)))?;

        Ok(request.uri().to_string())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("failed to delete '{}': {}", key, e)))?;

        Ok(())
    }
}

// =============================================================================
//  IN-PROCESS
// =============================================================================

/// Keeps objects in memory; used when no bucket is configured.
#[derive(Default, Clone)]
pub struct MemoryStore {
    objects: Arc<RwLock<HashMap<String, (String, Vec<u8>)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .read()
            .map(|objects| objects.contains_key(key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| AppError::Storage("memory store lock poisoned".into()))?;
        objects.insert(key.to_string(), (content_type.to_string(), bytes));
        Ok(())
    }

    async fn presigned_get(&self, key: &str, ttl: Duration) -> Result<String, AppError> {
        if !self.contains(key) {
            return Err(AppError::NotFound(format!("Object '{}' not found", key)));
        }
        Ok(format!("memory://{}?expires_in={}", key, ttl.as_secs()))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| AppError::Storage("memory store lock poisoned".into()))?;
        objects.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_defaults_and_caps() {
        assert_eq!(presign_ttl(None), Duration::from_secs(3600));
        assert_eq!(presign_ttl(Some(0)), Duration::from_secs(3600));
        assert_eq!(presign_ttl(Some(60)), Duration::from_secs(60));
        assert_eq!(presign_ttl(Some(30 * 24 * 3600)), Duration::from_secs(MAX_PRESIGN_TTL_SECS));
    }

    #[test]
    fn keys_are_prefixed_and_keep_the_extension() {
        let key = object_key(IMAGE_PREFIX, "Front View.JPG", "image/jpeg");
        assert!(key.starts_with("vehicles/images/"));
        assert!(key.ends_with(".jpg"));

        let fallback = object_key(DOCUMENT_PREFIX, "invoice", "application/pdf");
        assert!(fallback.starts_with("vehicles/documents/"));
        assert!(fallback.ends_with(".pdf"));
    }

    #[test]
    fn two_keys_for_the_same_file_differ() {
        assert_ne!(
            object_key(IMAGE_PREFIX, "a.png", "image/png"),
            object_key(IMAGE_PREFIX, "a.png", "image/png")
        );
    }

    #[test]
    fn image_allow_list() {
        assert!(is_allowed_image("image/webp"));
        assert!(is_allowed_image("IMAGE/PNG"));
        assert!(!is_allowed_image("application/pdf"));
        assert!(!is_allowed_image("image/svg+xml"));
    }

    #[test]
    fn spaces_endpoint_defaults_to_region_host() {
        let config = SpacesConfig {
            key: "k".into(),
            secret: "s".into(),
            region: "sgp1".into(),
            bucket: "cars".into(),
            endpoint: None,
        };
        assert_eq!(config.endpoint_url(), "https://sgp1.digitaloceanspaces.com");
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::new();
        store.put("vehicles/images/x.png", vec![1, 2, 3], "image/png").await.unwrap();
        let url = store.presigned_get("vehicles/images/x.png", Duration::from_secs(5)).await.unwrap();
        assert_eq!(url, "memory://vehicles/images/x.png?expires_in=5");
        store.delete("vehicles/images/x.png").await.unwrap();
        assert!(store.is_empty());
    }
}
