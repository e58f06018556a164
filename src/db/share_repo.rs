// src/db/share_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::share::VehicleShareToken};

#[derive(Clone, Default)]
pub struct VehicleShareTokenRepository;

impl VehicleShareTokenRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
        include_details: &[String],
        created_by: Option<&str>,
    ) -> Result<VehicleShareToken, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleShareToken>(
            r#"
            INSERT INTO cars.vehicle_share_tokens (
                vehicle_id, token, expires_at, include_details, is_active, created_by
            )
            VALUES ($1, $2, $3, $4, TRUE, $5)
            RETURNING *
            "#,
        )
        .bind(vehicle_id)
        .bind(token)
        .bind(expires_at)
        .bind(include_details)
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, "Share token collision, please retry"))
    }

    /// Only tokens that are active and not yet expired are returned.
    pub async fn get_by_token<'e, E>(&self, executor: E, token: &str) -> Result<VehicleShareToken, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleShareToken>(
            r#"
            SELECT * FROM cars.vehicle_share_tokens
            WHERE token = $1 AND is_active AND expires_at > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Share link is invalid or expired".into()))
    }

    pub async fn list_by_vehicle<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<Vec<VehicleShareToken>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tokens = sqlx::query_as::<_, VehicleShareToken>(
            r#"
            SELECT * FROM cars.vehicle_share_tokens
            WHERE vehicle_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(executor)
        .await?;

        Ok(tokens)
    }

    pub async fn deactivate<'e, E>(&self, executor: E, token: &str) -> Result<VehicleShareToken, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleShareToken>(
            r#"
            UPDATE cars.vehicle_share_tokens
            SET is_active = FALSE, updated_at = NOW()
            WHERE token = $1
            RETURNING *
            "#,
        )
        .bind(token)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("Share token not found".into()))
    }
}
