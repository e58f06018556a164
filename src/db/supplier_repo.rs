// src/db/supplier_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{
        error::AppError,
        query_builder::{BindParams, QueryBuilder},
    },
    models::supplier::{Supplier, SupplierValues},
};

const DUPLICATE_NAME: &str = "A supplier with this name already exists";

#[derive(Clone, Default)]
pub struct SupplierRepository;

impl SupplierRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<'e, E>(&self, executor: E, values: &SupplierValues) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO cars.suppliers (
                name, title, contact_number, email, address, other_contacts,
                supplier_type, country, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&values.name)
        .bind(&values.title)
        .bind(&values.contact_number)
        .bind(&values.email)
        .bind(&values.address)
        .bind(&values.other_contacts)
        .bind(values.supplier_type)
        .bind(&values.country)
        .bind(&values.notes)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, DUPLICATE_NAME))
    }

    pub async fn get_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>("SELECT * FROM cars.suppliers WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::not_found("Supplier", id))
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: &QueryBuilder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let built = filter.build("SELECT s.* FROM cars.suppliers s", None, Some("s.name ASC, s.id"), limit, offset, false);

        let suppliers = sqlx::query_as::<_, Supplier>(&built.sql)
            .bind_params(built.args)
            .fetch_all(executor)
            .await?;

        Ok(suppliers)
    }

    pub async fn count<'e, E>(&self, executor: E, filter: &QueryBuilder) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let built = filter.build("SELECT COUNT(*) FROM cars.suppliers s", None, None, 0, 0, true);

        let total: i64 = sqlx::query_scalar(&built.sql)
            .bind_params(built.args)
            .fetch_one(executor)
            .await?;

        Ok(total)
    }

    pub async fn search<'e, E>(&self, executor: E, term: &str, limit: i64) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pattern = format!("%{}%", term);
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT * FROM cars.suppliers
            WHERE is_active
              AND (name ILIKE $1 OR contact_number ILIKE $1 OR country ILIKE $1)
            ORDER BY name ASC, id ASC
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(executor)
        .await?;

        Ok(suppliers)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i64,
        values: &SupplierValues,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE cars.suppliers SET
                name = $2, title = $3, contact_number = $4, email = $5, address = $6,
                other_contacts = $7, supplier_type = $8, country = $9, notes = $10,
                updated_at = NOW()
            WHERE id = $1 AND is_active
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&values.name)
        .bind(&values.title)
        .bind(&values.contact_number)
        .bind(&values.email)
        .bind(&values.address)
        .bind(&values.other_contacts)
        .bind(values.supplier_type)
        .bind(&values.country)
        .bind(&values.notes)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_db(e, DUPLICATE_NAME))?
        .ok_or_else(|| AppError::not_found("Supplier", id))
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE cars.suppliers SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Supplier", id));
        }
        Ok(())
    }
}
