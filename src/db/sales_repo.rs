// src/db/sales_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{
        error::AppError,
        query_builder::{BindParams, QueryBuilder},
    },
    models::{
        analytics::StatusCount,
        enums::SaleStatus,
        vehicle::{SalesValues, VehicleSales},
    },
};

#[derive(Clone, Default)]
pub struct VehicleSalesRepository;

impl VehicleSalesRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_default<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<VehicleSales, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sales = sqlx::query_as::<_, VehicleSales>(
            "INSERT INTO cars.vehicle_sales (vehicle_id, sale_status) VALUES ($1, $2) RETURNING *",
        )
        .bind(vehicle_id)
        .bind(SaleStatus::default())
        .fetch_one(executor)
        .await?;

        Ok(sales)
    }

    pub async fn get_by_vehicle_id<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<VehicleSales, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleSales>("SELECT * FROM cars.vehicle_sales WHERE vehicle_id = $1")
            .bind(vehicle_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Sales details for vehicle {} not found", vehicle_id)))
    }

    pub async fn get_by_vehicle_ids<'e, E>(
        &self,
        executor: E,
        vehicle_ids: &[i64],
    ) -> Result<Vec<VehicleSales>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, VehicleSales>(
            "SELECT * FROM cars.vehicle_sales WHERE vehicle_id = ANY($1)",
        )
        .bind(vehicle_ids)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
        values: &SalesValues,
    ) -> Result<VehicleSales, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleSales>(
            r#"
            UPDATE cars.vehicle_sales SET
                customer_id = $2,
                sold_to_name = $3,
                sold_to_title = $4,
                contact_number = $5,
                customer_address = $6,
                sold_date = $7,
                revenue = $8,
                profit = $9,
                sale_remarks = $10,
                sale_status = $11,
                updated_at = NOW()
            WHERE vehicle_id = $1
            RETURNING *
            "#,
        )
        .bind(vehicle_id)
        .bind(values.customer_id)
        .bind(&values.sold_to_name)
        .bind(&values.sold_to_title)
        .bind(&values.contact_number)
        .bind(&values.customer_address)
        .bind(values.sold_date)
        .bind(values.revenue)
        .bind(values.profit)
        .bind(&values.sale_remarks)
        .bind(values.sale_status)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_db(e, "Sales record conflicts with an existing row"))?
        .ok_or_else(|| AppError::NotFound(format!("Sales details for vehicle {} not found", vehicle_id)))
    }

    /// Email of the customer linked to the vehicle's sale, if any.
    pub async fn customer_email<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let email: Option<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT c.email
            FROM cars.vehicle_sales vsa
            JOIN cars.customers c ON c.id = vsa.customer_id
            WHERE vsa.vehicle_id = $1
            "#,
        )
        .bind(vehicle_id)
        .fetch_optional(executor)
        .await?;

        Ok(email.flatten().filter(|e| !e.trim().is_empty()))
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
            "SELECT vsa.sale_status AS status, COUNT(*) AS count FROM cars.vehicle_sales vsa",
            Some("vsa.sale_status"),
            Some("vsa.sale_status ASC"),
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
