// src/db/image_repo.rs

use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::vehicle::VehicleImage};

#[derive(Clone, Default)]
pub struct VehicleImageRepository;

/// Column values for a freshly stored image object.
#[derive(Debug, Clone)]
pub struct NewImage<'a> {
    pub vehicle_id: i64,
    pub filename: &'a str,
    pub original_name: &'a str,
    pub file_size: i64,
    pub mime_type: &'a str,
    pub is_primary: bool,
    pub display_order: i32,
}

impl VehicleImageRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<'e, E>(&self, executor: E, image: &NewImage<'_>) -> Result<VehicleImage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleImage>(
            r#"
            INSERT INTO cars.vehicle_images (
                vehicle_id, filename, original_name, file_size, mime_type, is_primary, display_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(image.vehicle_id)
        .bind(image.filename)
        .bind(image.original_name)
        .bind(image.file_size)
        .bind(image.mime_type)
        .bind(image.is_primary)
        .bind(image.display_order)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, "An image with this object key already exists"))
    }

    pub async fn get_by_vehicle_id<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<Vec<VehicleImage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let images = sqlx::query_as::<_, VehicleImage>(
            r#"
            SELECT * FROM cars.vehicle_images
            WHERE vehicle_id = $1
            ORDER BY is_primary DESC, display_order ASC, id ASC
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(executor)
        .await?;

        Ok(images)
    }

    pub async fn get_by_vehicle_ids<'e, E>(
        &self,
        executor: E,
        vehicle_ids: &[i64],
    ) -> Result<Vec<VehicleImage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let images = sqlx::query_as::<_, VehicleImage>(
            r#"
            SELECT * FROM cars.vehicle_images
            WHERE vehicle_id = ANY($1)
            ORDER BY vehicle_id, is_primary DESC, display_order ASC, id ASC
            "#,
        )
        .bind(vehicle_ids)
        .fetch_all(executor)
        .await?;

        Ok(images)
    }

    pub async fn get_by_id<'e, E>(&self, executor: E, image_id: i64) -> Result<VehicleImage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleImage>("SELECT * FROM cars.vehicle_images WHERE id = $1")
            .bind(image_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::not_found("Image", image_id))
    }

    pub async fn get_by_filename<'e, E>(
        &self,
        executor: E,
        filename: &str,
    ) -> Result<VehicleImage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleImage>("SELECT * FROM cars.vehicle_images WHERE filename = $1")
            .bind(filename)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Image '{}' not found", filename)))
    }

    pub async fn clear_primary<'e, E>(&self, executor: E, vehicle_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE cars.vehicle_images
            SET is_primary = FALSE, updated_at = NOW()
            WHERE vehicle_id = $1 AND is_primary
            "#,
        )
        .bind(vehicle_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn set_primary<'e, E>(&self, executor: E, image_id: i64) -> Result<VehicleImage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleImage>(
            r#"
            UPDATE cars.vehicle_images
            SET is_primary = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(image_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::not_found("Image", image_id))
    }

    pub async fn next_display_order<'e, E>(&self, executor: E, vehicle_id: i64) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let next: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(display_order) + 1, 0) FROM cars.vehicle_images WHERE vehicle_id = $1",
        )
        .bind(vehicle_id)
        .fetch_one(executor)
        .await?;

        Ok(next)
    }

    /// Deletes the row and hands it back so the caller can drop the object.
    pub async fn delete<'e, E>(&self, executor: E, image_id: i64) -> Result<VehicleImage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleImage>("DELETE FROM cars.vehicle_images WHERE id = $1 RETURNING *")
            .bind(image_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::not_found("Image", image_id))
    }
}
