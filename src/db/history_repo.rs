// src/db/history_repo.rs

//! Append-only status history for the shipping and purchase siblings.
//!
//! Both tables share one shape, so a single repository serves either,
//! selected by [`HistoryKind`]. Every read derives
//! `hours_in_previous_status` from the previous row of the same vehicle.

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::history::{HistoryKind, NewHistoryEntry, StatusHistory},
};

#[derive(Clone, Copy)]
pub struct HistoryRepository {
    kind: HistoryKind,
}

impl HistoryRepository {
    pub fn new(kind: HistoryKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> HistoryKind {
        self.kind
    }

    /// Window over the whole table; outer queries filter and sort it.
    fn windowed(&self) -> String {
        format!(
            r#"SELECT
                id, vehicle_id, old_status, new_status, changed_by, change_remarks, changed_at,
                (EXTRACT(EPOCH FROM (
                    changed_at - LAG(changed_at) OVER (PARTITION BY vehicle_id ORDER BY changed_at, id)
                )) / 3600.0)::DOUBLE PRECISION AS hours_in_previous_status
            FROM {}"#,
            self.kind.table()
        )
    }

    pub async fn insert<'e, E>(&self, executor: E, entry: &NewHistoryEntry) -> Result<StatusHistory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO {} (vehicle_id, old_status, new_status, changed_by, change_remarks, changed_at)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
            RETURNING
                id, vehicle_id, old_status, new_status, changed_by, change_remarks, changed_at,
                NULL::DOUBLE PRECISION AS hours_in_previous_status
            "#,
            self.kind.table()
        );

        let row = sqlx::query_as::<_, StatusHistory>(&sql)
            .bind(entry.vehicle_id)
            .bind(&entry.old_status)
            .bind(&entry.new_status)
            .bind(&entry.changed_by)
            .bind(&entry.change_remarks)
            .bind(entry.changed_at)
            .fetch_one(executor)
            .await?;

        Ok(row)
    }

    /// Manual (possibly backdated) entries go through the same insert.
    pub async fn insert_manual_history_entry<'e, E>(
        &self,
        executor: E,
        entry: &NewHistoryEntry,
    ) -> Result<StatusHistory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.insert(executor, entry).await
    }

    pub async fn get_by_vehicle_id<'e, E>(
        &self,
        executor: E,
        vehicle_id: i64,
    ) -> Result<Vec<StatusHistory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT * FROM ({}) h WHERE h.vehicle_id = $1 ORDER BY h.changed_at DESC, h.id DESC",
            self.windowed()
        );

        let rows = sqlx::query_as::<_, StatusHistory>(&sql)
            .bind(vehicle_id)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    pub async fn get_recent<'e, E>(&self, executor: E, limit: i64) -> Result<Vec<StatusHistory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT * FROM ({}) h ORDER BY h.changed_at DESC, h.id DESC LIMIT $1",
            self.windowed()
        );

        let rows = sqlx::query_as::<_, StatusHistory>(&sql)
            .bind(limit)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    pub async fn get_by_status<'e, E>(&self, executor: E, status: &str) -> Result<Vec<StatusHistory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT * FROM ({}) h WHERE h.new_status = $1 ORDER BY h.changed_at DESC, h.id DESC",
            self.windowed()
        );

        let rows = sqlx::query_as::<_, StatusHistory>(&sql)
            .bind(status)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }

    /// Latest history row per vehicle.
    pub async fn get_current_status_for_all_vehicles<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<StatusHistory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"SELECT DISTINCT ON (h.vehicle_id) *
            FROM ({}) h
            ORDER BY h.vehicle_id, h.changed_at DESC, h.id DESC"#,
            self.windowed()
        );

        let rows = sqlx::query_as::<_, StatusHistory>(&sql)
            .fetch_all(executor)
            .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_targets_the_kind_table() {
        let shipping = HistoryRepository::new(HistoryKind::Shipping).windowed();
        assert!(shipping.ends_with("FROM cars.vehicle_shipping_history"));
        assert!(shipping.contains("PARTITION BY vehicle_id"));

        let purchase = HistoryRepository::new(HistoryKind::Purchase).windowed();
        assert!(purchase.ends_with("FROM cars.vehicle_purchase_history"));
    }
}
