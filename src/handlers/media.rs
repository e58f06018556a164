// src/handlers/media.rs

//! Multipart uploads for vehicle images and documents.

use axum::{
    extract::{multipart::Field, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{PermVehiclesAccess, PermVehiclesEdit, RequirePermission},
    models::{
        auth::CurrentUser,
        document::{UploadedFile, VehicleDocumentView},
        vehicle::{ImageUploadResult, PresignedUrl, VehicleImage},
    },
};

/// Upper bound for one multipart request body.
pub const UPLOAD_BODY_LIMIT: usize = 32 * 1024 * 1024;

#[allow(dead_code)]
#[derive(ToSchema)]
pub struct ImageUploadForm {
    /// One or more image files (jpeg, png, gif, webp).
    #[schema(value_type = Vec<String>)]
    pub images: Vec<Vec<u8>>,
}

#[allow(dead_code)]
#[derive(ToSchema)]
pub struct DocumentUploadForm {
    #[schema(example = "INVOICE")]
    pub document_type: String,
    #[schema(value_type = String, format = Binary)]
    pub document: Vec<u8>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageUrlQuery {
    pub expires_in: Option<u64>,
}

fn multipart_error(e: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {}", e))
}

async fn read_file(field: Field<'_>) -> Result<UploadedFile, AppError> {
    let original_name = field
        .file_name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "upload".to_string());
    let content_type = field.content_type().map(|s| s.to_string()).unwrap_or_default();
    let bytes = field.bytes().await.map_err(multipart_error)?;

    Ok(UploadedFile {
        original_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

// ---
// IMAGES
// ---

#[utoipa::path(
    post,
    path = "/car-service/api/v1/vehicles/upload-image/{id}",
    tag = "Media",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Every image stored", body = ImageUploadResult),
        (status = 207, description = "Some images stored, per-file errors listed", body = ImageUploadResult),
        (status = 400, description = "No image could be stored", body = ImageUploadResult),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_images(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermVehiclesEdit>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("images") {
            files.push(read_file(field).await?);
        }
    }

    let result = app_state.media_service.upload_images(id, files, &user).await?;

    let status = match (result.uploaded.is_empty(), result.errors.is_empty()) {
        (false, true) => StatusCode::CREATED,
        (false, false) => StatusCode::MULTI_STATUS,
        (true, _) => StatusCode::BAD_REQUEST,
    };
    Ok((status, Json(result)))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/vehicles/upload-image/{id}",
    tag = "Media",
    params(
        ("id" = String, Path, description = "Image filename: the last segment of its stored key"),
        ("expires_in" = Option<u64>, Query, description = "URL lifetime in seconds (default 3600)")
    ),
    responses(
        (status = 200, description = "Presigned download URL", body = PresignedUrl),
        (status = 404, description = "Image not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn image_url(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Path(filename): Path<String>,
    Query(query): Query<ImageUrlQuery>,
) -> Result<impl IntoResponse, AppError> {
    let url = app_state
        .media_service
        .image_url(&filename, query.expires_in)
        .await?;
    Ok(Json(url))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/vehicles/{id}/images",
    tag = "Media",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Images in display order", body = Vec<VehicleImage>),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_images(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let images = app_state.media_service.list_images(id).await?;
    Ok(Json(images))
}

#[utoipa::path(
    put,
    path = "/car-service/api/v1/vehicles/images/{image_id}/primary",
    tag = "Media",
    params(("image_id" = i64, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image is now the vehicle's only primary image", body = VehicleImage),
        (status = 404, description = "Image not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_primary_image(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermVehiclesEdit>,
    Path(image_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let image = app_state.media_service.set_primary_image(image_id, &user).await?;
    Ok(Json(image))
}

#[utoipa::path(
    delete,
    path = "/car-service/api/v1/vehicles/images/{image_id}",
    tag = "Media",
    params(("image_id" = i64, Path, description = "Image ID")),
    responses(
        (status = 204, description = "Image removed"),
        (status = 404, description = "Image not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_image(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermVehiclesEdit>,
    Path(image_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.media_service.delete_image(image_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// DOCUMENTS
// ---

#[utoipa::path(
    post,
    path = "/car-service/api/v1/vehicles/{id}/documents",
    tag = "Media",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body(content = DocumentUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored", body = VehicleDocumentView),
        (status = 400, description = "Missing file or unknown document type"),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_document(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermVehiclesEdit>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut document_type: Option<String> = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("document_type") => {
                document_type = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("document") => file = Some(read_file(field).await?),
            _ => {}
        }
    }

    let document_type = document_type
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("document_type is required".into()))?;
    let file = file.ok_or_else(|| AppError::BadRequest("document file is required".into()))?;

    let document = app_state
        .media_service
        .upload_document(id, &document_type, file, &user)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/vehicles/{id}/documents",
    tag = "Media",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Documents with presigned download URLs", body = Vec<VehicleDocumentView>),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let documents = app_state.media_service.list_documents(id).await?;
    Ok(Json(documents))
}

#[utoipa::path(
    delete,
    path = "/car-service/api/v1/vehicles/documents/{doc_id}",
    tag = "Media",
    params(("doc_id" = i64, Path, description = "Document ID")),
    responses(
        (status = 204, description = "Document removed"),
        (status = 404, description = "Document not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_document(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermVehiclesEdit>,
    Path(doc_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.media_service.delete_document(doc_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
