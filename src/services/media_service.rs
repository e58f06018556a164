// src/services/media_service.rs

//! Vehicle images and documents: object storage plus their metadata rows.

use std::sync::Arc;

use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{
        document_repo::NewDocument, image_repo::NewImage, VehicleDocumentRepository,
        VehicleImageRepository, VehicleRepository,
    },
    models::{
        auth::CurrentUser,
        document::{UploadedFile, VehicleDocument, VehicleDocumentView},
        enums::DocumentType,
        vehicle::{ImageUploadError, ImageUploadResult, PresignedUrl, VehicleImage},
    },
    services::{
        notification::{vehicle_ref, Notification, NotificationService},
        storage::{
            is_allowed_image, object_key, presign_ttl, ObjectStore, ALLOWED_IMAGE_TYPES,
            DOCUMENT_PREFIX, IMAGE_PREFIX,
        },
    },
};

/// Why a single file of a batch was refused before reaching storage.
pub fn check_image(file: &UploadedFile) -> Result<(), String> {
    if file.bytes.is_empty() {
        return Err("File is empty".to_string());
    }
    if !is_allowed_image(&file.content_type) {
        return Err(format!(
            "Unsupported image type '{}'. Allowed types: {}",
            file.content_type,
            ALLOWED_IMAGE_TYPES.join(", ")
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct MediaService {
    pool: PgPool,
    vehicles: VehicleRepository,
    images: VehicleImageRepository,
    documents: VehicleDocumentRepository,
    store: Arc<dyn ObjectStore>,
    notifier: NotificationService,
}

impl MediaService {
    pub fn new(pool: PgPool, store: Arc<dyn ObjectStore>, notifier: NotificationService) -> Self {
        Self {
            pool,
            vehicles: VehicleRepository::new(),
            images: VehicleImageRepository::new(),
            documents: VehicleDocumentRepository::new(),
            store,
            notifier,
        }
    }

    async fn ensure_vehicle(&self, vehicle_id: i64) -> Result<(), AppError> {
        if self.vehicles.exists(&self.pool, vehicle_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Vehicle", vehicle_id))
        }
    }

    async fn discard_object(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!(key = %key, error = %e, "failed to remove stored object");
        }
    }

    // =========================================================================
    //  IMAGES
    // =========================================================================

    /// Stores every acceptable file of the batch; the first one stored becomes
    /// the vehicle's primary image. Per-file failures are collected, not raised.
    #[tracing::instrument(skip(self, files, user), fields(user_id = %user.id, files = files.len()))]
    pub async fn upload_images(
        &self,
        vehicle_id: i64,
        files: Vec<UploadedFile>,
        user: &CurrentUser,
    ) -> Result<ImageUploadResult, AppError> {
        if files.is_empty() {
            return Err(AppError::BadRequest("No images were provided".to_string()));
        }
        self.ensure_vehicle(vehicle_id).await?;

        let mut uploaded: Vec<VehicleImage> = Vec::new();
        let mut errors: Vec<ImageUploadError> = Vec::new();

        for file in files {
            if let Err(error) = check_image(&file) {
                errors.push(ImageUploadError { filename: file.original_name, error });
                continue;
            }

            match self.store_image(vehicle_id, &file, uploaded.is_empty()).await {
                Ok(image) => uploaded.push(image),
                Err(e) => {
                    tracing::warn!(vehicle_id, filename = %file.original_name, error = %e, "image upload failed");
                    errors.push(ImageUploadError {
                        filename: file.original_name,
                        error: e.to_string(),
                    });
                }
            }
        }

        if !uploaded.is_empty() {
            tracing::info!(vehicle_id, uploaded = uploaded.len(), failed = errors.len(), "images uploaded");
            self.notifier.dispatch(Notification::new(
                "vehicle_images_uploaded",
                vehicle_ref(vehicle_id),
                json!({
                    "vehicle_id": vehicle_id,
                    "uploaded": uploaded.len(),
                    "failed": errors.len(),
                }),
                Some(&user.id),
            ));
        }

        Ok(ImageUploadResult { uploaded, errors })
    }

    async fn store_image(
        &self,
        vehicle_id: i64,
        file: &UploadedFile,
        make_primary: bool,
    ) -> Result<VehicleImage, AppError> {
        let content_type = file.content_type.trim().to_ascii_lowercase();
        let key = object_key(IMAGE_PREFIX, &file.original_name, &content_type);

        self.store.put(&key, file.bytes.clone(), &content_type).await?;

        let inserted = async {
            let mut tx = self.pool.begin().await?;
            if make_primary {
                self.images.clear_primary(&mut *tx, vehicle_id).await?;
            }
            let display_order = self.images.next_display_order(&mut *tx, vehicle_id).await?;
            let image = self
                .images
                .insert(
                    &mut *tx,
                    &NewImage {
                        vehicle_id,
                        filename: &key,
                        original_name: &file.original_name,
                        file_size: file.bytes.len() as i64,
                        mime_type: &content_type,
                        is_primary: make_primary,
                        display_order,
                    },
                )
                .await?;
            tx.commit().await?;
            Ok::<_, AppError>(image)
        }
        .await;

        if inserted.is_err() {
            self.discard_object(&key).await;
        }
        inserted
    }

    pub async fn list_images(&self, vehicle_id: i64) -> Result<Vec<VehicleImage>, AppError> {
        self.ensure_vehicle(vehicle_id).await?;
        self.images.get_by_vehicle_id(&self.pool, vehicle_id).await
    }

    /// Presigned GET for an image object, addressed by its stored key or the
    /// key's last segment.
    pub async fn image_url(
        &self,
        filename: &str,
        expires_in: Option<u64>,
    ) -> Result<PresignedUrl, AppError> {
        let key = if filename.contains('/') {
            filename.to_string()
        } else {
            format!("{}/{}", IMAGE_PREFIX, filename)
        };
        let image = self.images.get_by_filename(&self.pool, &key).await?;
        let ttl = presign_ttl(expires_in);
        let url = self.store.presigned_get(&image.filename, ttl).await?;

        Ok(PresignedUrl {
            url,
            expires_in_seconds: ttl.as_secs(),
        })
    }

    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn set_primary_image(
        &self,
        image_id: i64,
        user: &CurrentUser,
    ) -> Result<VehicleImage, AppError> {
        let mut tx = self.pool.begin().await?;

        let image = self.images.get_by_id(&mut *tx, image_id).await?;
        self.images.clear_primary(&mut *tx, image.vehicle_id).await?;
        let image = self.images.set_primary(&mut *tx, image_id).await?;

        tx.commit().await?;

        self.notifier.dispatch(Notification::new(
            "vehicle_primary_image_changed",
            vehicle_ref(image.vehicle_id),
            json!({ "vehicle_id": image.vehicle_id, "image_id": image.id }),
            Some(&user.id),
        ));

        Ok(image)
    }

    /// Removes an image; if it was primary the next image in display order
    /// takes over.
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn delete_image(&self, image_id: i64, user: &CurrentUser) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = self.images.delete(&mut *tx, image_id).await?;
        if removed.is_primary {
            let remaining = self.images.get_by_vehicle_id(&mut *tx, removed.vehicle_id).await?;
            if let Some(next) = remaining.into_iter().min_by_key(|i| (i.display_order, i.id)) {
                self.images.set_primary(&mut *tx, next.id).await?;
            }
        }

        tx.commit().await?;

        self.discard_object(&removed.filename).await;

        self.notifier.dispatch(Notification::new(
            "vehicle_image_deleted",
            vehicle_ref(removed.vehicle_id),
            json!({ "vehicle_id": removed.vehicle_id, "image_id": removed.id }),
            Some(&user.id),
        ));

        Ok(())
    }

    // =========================================================================
    //  DOCUMENTS
    // =========================================================================

    #[tracing::instrument(skip(self, file, user), fields(user_id = %user.id))]
    pub async fn upload_document(
        &self,
        vehicle_id: i64,
        document_type: &str,
        file: UploadedFile,
        user: &CurrentUser,
    ) -> Result<VehicleDocumentView, AppError> {
        let document_type: DocumentType = document_type.parse()?;
        if file.bytes.is_empty() {
            return Err(AppError::BadRequest("Document file is empty".to_string()));
        }
        self.ensure_vehicle(vehicle_id).await?;

        let content_type = if file.content_type.trim().is_empty() {
            "application/octet-stream".to_string()
        } else {
            file.content_type.trim().to_ascii_lowercase()
        };
        let key = object_key(DOCUMENT_PREFIX, &file.original_name, &content_type);
        let file_size = file.bytes.len() as i64;

        self.store.put(&key, file.bytes, &content_type).await?;

        let document = match self
            .documents
            .insert(
                &self.pool,
                &NewDocument {
                    vehicle_id,
                    document_type,
                    filename: &key,
                    original_name: &file.original_name,
                    file_size,
                    mime_type: &content_type,
                    uploaded_by: Some(&user.id),
                },
            )
            .await
        {
            Ok(document) => document,
            Err(e) => {
                self.discard_object(&key).await;
                return Err(e);
            }
        };

        self.notifier.dispatch(Notification::new(
            "vehicle_document_uploaded",
            vehicle_ref(vehicle_id),
            json!({
                "vehicle_id": vehicle_id,
                "document_id": document.id,
                "document_type": document.document_type,
            }),
            Some(&user.id),
        ));

        Ok(self.with_url(document).await)
    }

    async fn with_url(&self, document: VehicleDocument) -> VehicleDocumentView {
        let url = match self
            .store
            .presigned_get(&document.filename, presign_ttl(None))
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(document_id = document.id, error = %e, "could not presign document");
                None
            }
        };
        VehicleDocumentView { document, url }
    }

    pub async fn list_documents(&self, vehicle_id: i64) -> Result<Vec<VehicleDocumentView>, AppError> {
        self.ensure_vehicle(vehicle_id).await?;
        let documents = self.documents.get_by_vehicle_id(&self.pool, vehicle_id).await?;

        let mut views = Vec::with_capacity(documents.len());
        for document in documents {
            views.push(self.with_url(document).await);
        }
        Ok(views)
    }

    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn delete_document(&self, document_id: i64, user: &CurrentUser) -> Result<(), AppError> {
        let removed = self.documents.delete(&self.pool, document_id).await?;
        self.discard_object(&removed.filename).await;

        self.notifier.dispatch(Notification::new(
            "vehicle_document_deleted",
            vehicle_ref(removed.vehicle_id),
            json!({ "vehicle_id": removed.vehicle_id, "document_id": removed.id }),
            Some(&user.id),
        ));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content_type: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            original_name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn accepts_allowed_image_types() {
        assert!(check_image(&file("a.jpg", "image/jpeg", b"x")).is_ok());
        assert!(check_image(&file("a.webp", "image/webp", b"x")).is_ok());
    }

    #[test]
    fn refuses_other_types_and_empty_files() {
        let err = check_image(&file("a.pdf", "application/pdf", b"x")).unwrap_err();
        assert!(err.contains("application/pdf"));
        assert!(err.contains("image/jpeg"));

        assert_eq!(check_image(&file("a.png", "image/png", b"")).unwrap_err(), "File is empty");
    }
}
