// src/models/document.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::enums::DocumentType;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct VehicleDocument {
    pub id: i64,
    pub vehicle_id: i64,
    pub document_type: DocumentType,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Document row plus a short-lived download link.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VehicleDocumentView {
    #[serde(flatten)]
    pub document: VehicleDocument,
    pub url: Option<String>,
}

/// Raw upload handed from the multipart decoder to the service.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
