// src/db/shipping_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{
        error::AppError,
        query_builder::{BindParams, QueryBuilder},
    },
    models::{
        analytics::StatusCount,
        enums::ShippingStatus,
        vehicle::{ShippingValues, VehicleShipping},
    },
};

#[derive(Clone, Default)]
pub struct VehicleShippingRepository;

impl VehicleShippingRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_default<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<VehicleShipping, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let shipping = sqlx::query_as::<_, VehicleShipping>(
            r#"
            INSERT INTO cars.vehicle_shipping (vehicle_id, shipping_status)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(vehicle_id)
        .bind(ShippingStatus::default())
        .fetch_one(executor)
        .await?;

        Ok(shipping)
    }

    pub async fn get_by_vehicle_id<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<VehicleShipping, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleShipping>(
            "SELECT * FROM cars.vehicle_shipping WHERE vehicle_id = $1",
        )
        .bind(vehicle_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Shipping details for vehicle {} not found", vehicle_id)))
    }

    /// Reads the row and locks it until the surrounding transaction ends.
    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<VehicleShipping, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleShipping>(
            "SELECT * FROM cars.vehicle_shipping WHERE vehicle_id = $1 FOR UPDATE",
        )
        .bind(vehicle_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Shipping details for vehicle {} not found", vehicle_id)))
    }

    pub async fn get_by_vehicle_ids<'e, E>(
        &self,
        executor: E,
        vehicle_ids: &[i64],
    ) -> Result<Vec<VehicleShipping>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, VehicleShipping>(
            "SELECT * FROM cars.vehicle_shipping WHERE vehicle_id = ANY($1)",
        )
        .bind(vehicle_ids)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    /// Overwrites every mutable column, status included.
    pub async fn update_shipping_status<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
        values: &ShippingValues,
    ) -> Result<VehicleShipping, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleShipping>(
            r#"
            UPDATE cars.vehicle_shipping SET
                vessel_name = $2,
                departure_harbour = $3,
                shipment_date = $4,
                arrival_date = $5,
                clearing_date = $6,
                shipping_status = $7,
                updated_at = NOW()
            WHERE vehicle_id = $1
            RETURNING *
            "#,
        )
        .bind(vehicle_id)
        .bind(&values.vessel_name)
        .bind(&values.departure_harbour)
        .bind(values.shipment_date)
        .bind(values.arrival_date)
        .bind(values.clearing_date)
        .bind(values.shipping_status)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Shipping details for vehicle {} not found", vehicle_id)))
    }

    pub async fn status_counts<'e, E>(
        &self,
        executor: E,
        filter: &QueryBuilder,
    ) -> Result<Vec<StatusCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let built = filter.build(
            "SELECT vs.shipping_status AS status, COUNT(*) AS count FROM cars.vehicle_shipping vs",
            Some("vs.shipping_status"),
            Some("vs.shipping_status ASC"),
            0,
            0,
            false,
        );

        let rows = sqlx::query_as::<_, StatusCount>(&built.sql)
            .bind_params(built.args)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }
}
