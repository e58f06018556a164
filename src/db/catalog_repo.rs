// src/db/catalog_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::catalog::{VehicleMake, VehicleModel},
};

#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  MAKES
    // =========================================================================

    pub async fn insert_make<'e, E>(
        &self,
        executor: E,
        make_name: &str,
        is_active: bool,
    ) -> Result<VehicleMake, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleMake>(
            "INSERT INTO cars.vehicle_makes (make_name, is_active) VALUES ($1, $2) RETURNING *",
        )
        .bind(make_name)
        .bind(is_active)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, &format!("Make '{}' already exists", make_name)))
    }

    pub async fn list_makes<'e, E>(&self, executor: E, only_active: bool) -> Result<Vec<VehicleMake>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let makes = sqlx::query_as::<_, VehicleMake>(
            "SELECT * FROM cars.vehicle_makes WHERE ($1 = FALSE OR is_active) ORDER BY make_name ASC",
        )
        .bind(only_active)
        .fetch_all(executor)
        .await?;

        Ok(makes)
    }

    pub async fn get_make<'e, E>(&self, executor: E, id: i64) -> Result<VehicleMake, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleMake>("SELECT * FROM cars.vehicle_makes WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::not_found("Make", id))
    }

    pub async fn update_make<'e, E>(
        &self,
        executor: E,
        id: i64,
        make_name: &str,
        is_active: bool,
    ) -> Result<VehicleMake, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleMake>(
            r#"
            UPDATE cars.vehicle_makes
            SET make_name = $2, is_active = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(make_name)
        .bind(is_active)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_db(e, &format!("Make '{}' already exists", make_name)))?
        .ok_or_else(|| AppError::not_found("Make", id))
    }

    pub async fn delete_make<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM cars.vehicle_makes WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Make", id));
        }
        Ok(())
    }

    // =========================================================================
    //  MODELS
    // =========================================================================

    pub async fn insert_model<'e, E>(
        &self,
        executor: E,
        make_id: i64,
        model_name: &str,
        is_active: bool,
    ) -> Result<VehicleModel, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleModel>(
            r#"
            INSERT INTO cars.vehicle_models (make_id, model_name, is_active)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(make_id)
        .bind(model_name)
        .bind(is_active)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, &format!("Model '{}' already exists for this make", model_name)))
    }

    pub async fn list_models<'e, E>(
        &self,
        executor: E,
        make_id: Option<i64>,
        only_active: bool,
    ) -> Result<Vec<VehicleModel>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let models = sqlx::query_as::<_, VehicleModel>(
            r#"
            SELECT * FROM cars.vehicle_models
            WHERE ($1::BIGINT IS NULL OR make_id = $1)
              AND ($2 = FALSE OR is_active)
            ORDER BY model_name ASC
            "#,
        )
        .bind(make_id)
        .bind(only_active)
        .fetch_all(executor)
        .await?;

        Ok(models)
    }

    pub async fn get_model<'e, E>(&self, executor: E, id: i64) -> Result<VehicleModel, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleModel>("SELECT * FROM cars.vehicle_models WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::not_found("Model", id))
    }

    pub async fn update_model<'e, E>(
        &self,
        executor: E,
        id: i64,
        make_id: i64,
        model_name: &str,
        is_active: bool,
    ) -> Result<VehicleModel, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleModel>(
            r#"
            UPDATE cars.vehicle_models
            SET make_id = $2, model_name = $3, is_active = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(make_id)
        .bind(model_name)
        .bind(is_active)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_db(e, &format!("Model '{}' already exists for this make", model_name)))?
        .ok_or_else(|| AppError::not_found("Model", id))
    }

    pub async fn delete_model<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM cars.vehicle_models WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Model", id));
        }
        Ok(())
    }
}
