// src/db/customer_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{
        error::AppError,
        query_builder::{BindParams, QueryBuilder},
    },
    models::customer::{Customer, CustomerValues},
};

const DUPLICATE_CONTACT: &str = "A customer with this contact number already exists";

#[derive(Clone, Default)]
pub struct CustomerRepository;

impl CustomerRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<'e, E>(&self, executor: E, values: &CustomerValues) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO cars.customers (
                name, title, contact_number, email, address, other_contacts, customer_type, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&values.name)
        .bind(&values.title)
        .bind(&values.contact_number)
        .bind(&values.email)
        .bind(&values.address)
        .bind(&values.other_contacts)
        .bind(values.customer_type)
        .bind(&values.notes)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_db(e, DUPLICATE_CONTACT))
    }

    pub async fn get_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>("SELECT * FROM cars.customers WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::not_found("Customer", id))
    }

    pub async fn get_by_contact_number<'e, E>(
        &self,
        executor: E,
        contact_number: &str,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM cars.customers WHERE contact_number = $1 AND is_active",
        )
        .bind(contact_number)
        .fetch_optional(executor)
        .await?;

        Ok(customer)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: &QueryBuilder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let built = filter.build("SELECT c.* FROM cars.customers c", None, Some("c.name ASC, c.id"), limit, offset, false);

        let customers = sqlx::query_as::<_, Customer>(&built.sql)
            .bind_params(built.args)
            .fetch_all(executor)
            .await?;

        Ok(customers)
    }

    pub async fn count<'e, E>(&self, executor: E, filter: &QueryBuilder) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let built = filter.build("SELECT COUNT(*) FROM cars.customers c", None, None, 0, 0, true);

        let total: i64 = sqlx::query_scalar(&built.sql)
            .bind_params(built.args)
            .fetch_one(executor)
            .await?;

        Ok(total)
    }

    /// Quick lookup over name, contact number and email.
    pub async fn search<'e, E>(&self, executor: E, term: &str, limit: i64) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pattern = format!("%{}%", term);
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM cars.customers
            WHERE is_active
              AND (name ILIKE $1 OR contact_number ILIKE $1 OR email ILIKE $1)
            ORDER BY name ASC, id ASC
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(executor)
        .await?;

        Ok(customers)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i64,
        values: &CustomerValues,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE cars.customers SET
                name = $2, title = $3, contact_number = $4, email = $5, address = $6,
                other_contacts = $7, customer_type = $8, notes = $9, updated_at = NOW()
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
        .bind(values.customer_type)
        .bind(&values.notes)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_db(e, DUPLICATE_CONTACT))?
        .ok_or_else(|| AppError::not_found("Customer", id))
    }

    /// Refreshes identity fields of an existing customer during order intake.
    /// Absent email / address keep their stored value.
    pub async fn refresh_contact_details<'e, E>(
        &self,
        executor: E,
        id: i64,
        name: &str,
        title: Option<&str>,
        email: Option<&str>,
        address: Option<&str>,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE cars.customers SET
                name = $2,
                title = COALESCE($3, title),
                email = COALESCE($4, email),
                address = COALESCE($5, address),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(title)
        .bind(email)
        .bind(address)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::not_found("Customer", id))
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE cars.customers SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Customer", id));
        }
        Ok(())
    }
}
