// src/db/vehicle_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{
        error::AppError,
        query_builder::{BindParams, QueryBuilder},
    },
    models::{analytics::BrandCount, vehicle::{Vehicle, VehicleValues}},
};

/// Vehicles joined to their 1:1 siblings so filters may reference any alias.
pub(crate) const VEHICLE_FROM: &str = "FROM cars.vehicles v \
     LEFT JOIN cars.vehicle_shipping vs ON vs.vehicle_id = v.id \
     LEFT JOIN cars.vehicle_financials vf ON vf.vehicle_id = v.id \
     LEFT JOIN cars.vehicle_sales vsa ON vsa.vehicle_id = v.id \
     LEFT JOIN cars.vehicle_purchase vp ON vp.vehicle_id = v.id";

const DEFAULT_ORDER: &str = "v.created_at DESC, v.id DESC";

#[derive(Clone, Default)]
pub struct VehicleRepository;

impl VehicleRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<'e, E>(&self, executor: E, values: &VehicleValues) -> Result<Vehicle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO cars.vehicles (
                code, make, model, trim_level, year_of_manufacture, color, mileage_km,
                chassis_id, condition_status, currency, price_quote, auction_grade,
                auction_price, cif_value, hs_code, registration_number, record_date,
                internal_notes, is_featured, featured_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
                $19, CASE WHEN $19 THEN NOW() ELSE NULL END
            )
            RETURNING *
            "#,
        )
        .bind(values.code)
        .bind(&values.make)
        .bind(&values.model)
        .bind(&values.trim_level)
        .bind(values.year_of_manufacture)
        .bind(&values.color)
        .bind(values.mileage_km)
        .bind(&values.chassis_id)
        .bind(values.condition_status)
        .bind(values.currency)
        .bind(values.price_quote)
        .bind(&values.auction_grade)
        .bind(values.auction_price)
        .bind(values.cif_value)
        .bind(&values.hs_code)
        .bind(&values.registration_number)
        .bind(values.record_date)
        .bind(&values.internal_notes)
        .bind(values.is_featured)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, "A vehicle with this chassis ID already exists"))
    }

    pub async fn get_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Vehicle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Vehicle>("SELECT * FROM cars.vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::not_found("Vehicle", id))
    }

    pub async fn exists<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM cars.vehicles WHERE id = $1)")
                .bind(id)
                .fetch_one(executor)
                .await?;
        Ok(found)
    }

    /// One page of vehicles matching `filter`, in the filter's order with
    /// `v.id DESC` as the tie-breaker (or newest first when unsorted).
    pub async fn get_all<'e, E>(
        &self,
        executor: E,
        filter: &QueryBuilder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Vehicle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let base = format!("SELECT v.* {}", VEHICLE_FROM);
        let built = filter.build(&base, None, Some(DEFAULT_ORDER), limit, offset, false);

        let vehicles = sqlx::query_as::<_, Vehicle>(&built.sql)
            .bind_params(built.args)
            .fetch_all(executor)
            .await?;

        Ok(vehicles)
    }

    pub async fn count<'e, E>(&self, executor: E, filter: &QueryBuilder) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let base = format!("SELECT COUNT(*) {}", VEHICLE_FROM);
        let built = filter.build(&base, None, None, 0, 0, true);

        let total: i64 = sqlx::query_scalar(&built.sql)
            .bind_params(built.args)
            .fetch_one(executor)
            .await?;

        Ok(total)
    }

    /// Full overwrite of the mutable columns.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i64,
        values: &VehicleValues,
    ) -> Result<Vehicle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE cars.vehicles SET
                code = $2, make = $3, model = $4, trim_level = $5, year_of_manufacture = $6,
                color = $7, mileage_km = $8, chassis_id = $9, condition_status = $10,
                currency = $11, price_quote = $12, auction_grade = $13, auction_price = $14,
                cif_value = $15, hs_code = $16, registration_number = $17, record_date = $18,
                internal_notes = $19,
                featured_at = CASE
                    WHEN $20 AND NOT is_featured THEN NOW()
                    WHEN NOT $20 THEN NULL
                    ELSE featured_at
                END,
                is_featured = $20,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(values.code)
        .bind(&values.make)
        .bind(&values.model)
        .bind(&values.trim_level)
        .bind(values.year_of_manufacture)
        .bind(&values.color)
        .bind(values.mileage_km)
        .bind(&values.chassis_id)
        .bind(values.condition_status)
        .bind(values.currency)
        .bind(values.price_quote)
        .bind(&values.auction_grade)
        .bind(values.auction_price)
        .bind(values.cif_value)
        .bind(&values.hs_code)
        .bind(&values.registration_number)
        .bind(values.record_date)
        .bind(&values.internal_notes)
        .bind(values.is_featured)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_db(e, "A vehicle with this chassis ID already exists"))?
        .ok_or_else(|| AppError::not_found("Vehicle", id))
    }

    pub async fn set_featured<'e, E>(
        &self,
        executor: E,
        id: i64,
        is_featured: bool,
    ) -> Result<Vehicle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE cars.vehicles SET
                is_featured = $2,
                featured_at = CASE WHEN $2 THEN NOW() ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(is_featured)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle", id))
    }

    /// Removes the vehicle; sibling, image and document rows cascade.
    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM cars.vehicles WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Vehicle", id));
        }
        Ok(())
    }

    pub async fn get_vehicle_brand_count<'e, E>(
        &self,
        executor: E,
        filter: &QueryBuilder,
    ) -> Result<Vec<BrandCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let built = filter.build(
            "SELECT v.make AS brand, COUNT(*) AS count FROM cars.vehicles v",
            Some("v.make"),
            Some("v.make ASC"),
            0,
            0,
            false,
        );

        let rows = sqlx::query_as::<_, BrandCount>(&built.sql)
            .bind_params(built.args)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }
}
