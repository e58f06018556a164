// src/db/purchase_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{
        error::AppError,
        query_builder::{BindParams, QueryBuilder},
    },
    models::{
        analytics::StatusCount,
        enums::PurchaseStatus,
        vehicle::{PurchaseValues, VehiclePurchase},
    },
};

#[derive(Clone, Default)]
pub struct VehiclePurchaseRepository;

impl VehiclePurchaseRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_default<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<VehiclePurchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchase = sqlx::query_as::<_, VehiclePurchase>(
            "INSERT INTO cars.vehicle_purchase (vehicle_id, purchase_status) VALUES ($1, $2) RETURNING *",
        )
        .bind(vehicle_id)
        .bind(PurchaseStatus::default())
        .fetch_one(executor)
        .await?;

        Ok(purchase)
    }

    pub async fn get_by_vehicle_id<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<VehiclePurchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehiclePurchase>(
            "SELECT * FROM cars.vehicle_purchase WHERE vehicle_id = $1",
        )
        .bind(vehicle_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Purchase details for vehicle {} not found", vehicle_id)))
    }

    /// Reads the row and locks it until the surrounding transaction ends.
    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<VehiclePurchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehiclePurchase>(
            "SELECT * FROM cars.vehicle_purchase WHERE vehicle_id = $1 FOR UPDATE",
        )
        .bind(vehicle_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Purchase details for vehicle {} not found", vehicle_id)))
    }

    pub async fn get_by_vehicle_ids<'e, E>(
        &self,
        executor: E,
        vehicle_ids: &[i64],
    ) -> Result<Vec<VehiclePurchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, VehiclePurchase>(
            "SELECT * FROM cars.vehicle_purchase WHERE vehicle_id = ANY($1)",
        )
        .bind(vehicle_ids)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn update_purchase_status<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
        values: &PurchaseValues,
    ) -> Result<VehiclePurchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehiclePurchase>(
            r#"
            UPDATE cars.vehicle_purchase SET
                supplier_id = $2,
                bought_from_name = $3,
                bought_from_title = $4,
                bought_from_contact = $5,
                bought_from_address = $6,
                bought_from_other_contacts = $7,
                purchase_remarks = $8,
                lc_bank = $9,
                lc_number = $10,
                lc_cost_jpy = $11,
                purchase_date = $12,
                purchase_status = $13,
                updated_at = NOW()
            WHERE vehicle_id = $1
            RETURNING *
            "#,
        )
        .bind(vehicle_id)
        .bind(values.supplier_id)
        .bind(&values.bought_from_name)
        .bind(&values.bought_from_title)
        .bind(&values.bought_from_contact)
        .bind(&values.bought_from_address)
        .bind(&values.bought_from_other_contacts)
        .bind(&values.purchase_remarks)
        .bind(&values.lc_bank)
        .bind(&values.lc_number)
        .bind(values.lc_cost_jpy)
        .bind(values.purchase_date)
        .bind(values.purchase_status)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_db(e, "Purchase record conflicts with an existing row"))?
        .ok_or_else(|| AppError::NotFound(format!("Purchase details for vehicle {} not found", vehicle_id)))
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
            "SELECT vp.purchase_status AS status, COUNT(*) AS count FROM cars.vehicle_purchase vp",
            Some("vp.purchase_status"),
            Some("vp.purchase_status ASC"),
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
