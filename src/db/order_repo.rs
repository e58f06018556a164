// src/db/order_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{
        error::AppError,
        query_builder::{BindParams, QueryBuilder},
    },
    models::{
        enums::OrderStatus,
        order::{CustomerOrder, OrderValues},
    },
};

#[derive(Clone, Default)]
pub struct OrderRepository;

impl OrderRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<'e, E>(&self, executor: E, values: &OrderValues) -> Result<CustomerOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CustomerOrder>(
            r#"
            INSERT INTO cars.customer_orders (
                order_number, customer_id, preferred_make, preferred_model,
                preferred_year_min, preferred_year_max, preferred_color, max_mileage_km,
                preferred_condition, budget_min, budget_max, features, priority,
                shipping_method, expected_delivery_date, additional_notes, order_status,
                is_draft, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(&values.order_number)
        .bind(values.customer_id)
        .bind(&values.preferred_make)
        .bind(&values.preferred_model)
        .bind(values.preferred_year_min)
        .bind(values.preferred_year_max)
        .bind(&values.preferred_color)
        .bind(values.max_mileage_km)
        .bind(&values.preferred_condition)
        .bind(values.budget_min)
        .bind(values.budget_max)
        .bind(&values.features)
        .bind(values.priority)
        .bind(values.shipping_method)
        .bind(values.expected_delivery_date)
        .bind(&values.additional_notes)
        .bind(values.order_status)
        .bind(values.is_draft)
        .bind(&values.created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, "An order with this number already exists"))
    }

    pub async fn get_by_id<'e, E>(&self, executor: E, id: i64) -> Result<CustomerOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CustomerOrder>("SELECT * FROM cars.customer_orders WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::not_found("Order", id))
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: &QueryBuilder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CustomerOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let built = filter.build("SELECT o.* FROM cars.customer_orders o", None, None, limit, offset, false);

        let orders = sqlx::query_as::<_, CustomerOrder>(&built.sql)
            .bind_params(built.args)
            .fetch_all(executor)
            .await?;

        Ok(orders)
    }

    pub async fn count<'e, E>(&self, executor: E, filter: &QueryBuilder) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let built = filter.build("SELECT COUNT(*) FROM cars.customer_orders o", None, None, 0, 0, true);

        let total: i64 = sqlx::query_scalar(&built.sql)
            .bind_params(built.args)
            .fetch_one(executor)
            .await?;

        Ok(total)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: i64,
        status: OrderStatus,
    ) -> Result<CustomerOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CustomerOrder>(
            r#"
            UPDATE cars.customer_orders SET
                order_status = $2,
                is_draft = ($2 = 'DRAFT'),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::not_found("Order", id))
    }
}
