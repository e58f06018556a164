// src/models/analytics.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BrandCount {
    pub brand: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
pub struct FinancialSummary {
    pub vehicle_count: i64,
    pub total_charges_lkr: Decimal,
    pub total_tt_lkr: Decimal,
    pub total_duty_lkr: Decimal,
    pub total_clearing_lkr: Decimal,
    pub total_other_expenses_lkr: Decimal,
    pub total_cost_lkr: Decimal,
    pub average_cost_lkr: Decimal,
}
