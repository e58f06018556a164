// src/db/document_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::{document::VehicleDocument, enums::DocumentType},
};

#[derive(Clone, Default)]
pub struct VehicleDocumentRepository;

#[derive(Debug, Clone)]
pub struct NewDocument<'a> {
    pub vehicle_id: i64,
    pub document_type: DocumentType,
    pub filename: &'a str,
    pub original_name: &'a str,
    pub file_size: i64,
    pub mime_type: &'a str,
    pub uploaded_by: Option<&'a str>,
}

impl VehicleDocumentRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        document: &NewDocument<'_>,
    ) -> Result<VehicleDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleDocument>(
            r#"
            INSERT INTO cars.vehicle_documents (
                vehicle_id, document_type, filename, original_name, file_size, mime_type, uploaded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(document.vehicle_id)
        .bind(document.document_type)
        .bind(document.filename)
        .bind(document.original_name)
        .bind(document.file_size)
        .bind(document.mime_type)
        .bind(document.uploaded_by)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, "A document with this object key already exists"))
    }

    pub async fn get_by_vehicle_id<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<Vec<VehicleDocument>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let documents = sqlx::query_as::<_, VehicleDocument>(
            "SELECT * FROM cars.vehicle_documents WHERE vehicle_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(vehicle_id)
        .fetch_all(executor)
        .await?;

        Ok(documents)
    }

    pub async fn delete<'e, E>(&self, executor: E, document_id: i64) -> Result<VehicleDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleDocument>(
            "DELETE FROM cars.vehicle_documents WHERE id = $1 RETURNING *",
        )
        .bind(document_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::not_found("Document", document_id))
    }
}
