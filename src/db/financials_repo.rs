// src/db/financials_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{
        error::AppError,
        query_builder::{BindParams, QueryBuilder},
    },
    models::{
        analytics::FinancialSummary,
        vehicle::{FinancialValues, VehicleFinancials},
    },
};

#[derive(Clone, Default)]
pub struct VehicleFinancialsRepository;

impl VehicleFinancialsRepository {
    pub fn new() -> Self {
        Self
    }

    /// All amounts start at zero.
    pub async fn insert_default<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<VehicleFinancials, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let financials = sqlx::query_as::<_, VehicleFinancials>(
            "INSERT INTO cars.vehicle_financials (vehicle_id) VALUES ($1) RETURNING *",
        )
        .bind(vehicle_id)
        .fetch_one(executor)
        .await?;

        Ok(financials)
    }

    pub async fn get_by_vehicle_id<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<VehicleFinancials, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleFinancials>(
            "SELECT * FROM cars.vehicle_financials WHERE vehicle_id = $1",
        )
        .bind(vehicle_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Financial details for vehicle {} not found", vehicle_id)))
    }

    pub async fn get_by_vehicle_ids<'e, E>(
        &self,
        executor: E,
        vehicle_ids: &[i64],
    ) -> Result<Vec<VehicleFinancials>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, VehicleFinancials>(
            "SELECT * FROM cars.vehicle_financials WHERE vehicle_id = ANY($1)",
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
        values: &FinancialValues,
    ) -> Result<VehicleFinancials, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, VehicleFinancials>(
            r#"
            UPDATE cars.vehicle_financials SET
                charges_lkr = $2,
                tt_lkr = $3,
                duty_lkr = $4,
                clearing_lkr = $5,
                other_expenses_lkr = $6,
                total_cost_lkr = $7,
                updated_at = NOW()
            WHERE vehicle_id = $1
            RETURNING *
            "#,
        )
        .bind(vehicle_id)
        .bind(values.charges_lkr)
        .bind(values.tt_lkr)
        .bind(values.duty_lkr)
        .bind(values.clearing_lkr)
        .bind(values.other_expenses_lkr)
        .bind(values.total_cost_lkr)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Financial details for vehicle {} not found", vehicle_id)))
    }

    pub async fn summary<'e, E>(
        &self,
        executor: E,
        filter: &QueryBuilder,
    ) -> Result<FinancialSummary, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let built = filter.build(
            r#"SELECT
                COUNT(*) AS vehicle_count,
                COALESCE(SUM(vf.charges_lkr), 0) AS total_charges_lkr,
                COALESCE(SUM(vf.tt_lkr), 0) AS total_tt_lkr,
                COALESCE(SUM(vf.duty_lkr), 0) AS total_duty_lkr,
                COALESCE(SUM(vf.clearing_lkr), 0) AS total_clearing_lkr,
                COALESCE(SUM(vf.other_expenses_lkr), 0) AS total_other_expenses_lkr,
                COALESCE(SUM(vf.total_cost_lkr), 0) AS total_cost_lkr,
                COALESCE(ROUND(AVG(vf.total_cost_lkr), 2), 0) AS average_cost_lkr
            FROM cars.vehicle_financials vf"#,
            None,
            None,
            0,
            0,
            true,
        );

        let summary = sqlx::query_as::<_, FinancialSummary>(&built.sql)
            .bind_params(built.args)
            .fetch_one(executor)
            .await?;

        Ok(summary)
    }
}
