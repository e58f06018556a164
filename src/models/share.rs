// src/models/share.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::enums::{ConditionStatus, PurchaseStatus, ShippingStatus};

pub const SHARE_DETAIL_SHIPPING: &str = "shipping";
pub const SHARE_DETAIL_FINANCIAL: &str = "financial";
pub const SHARE_DETAIL_PURCHASE: &str = "purchase";
pub const SHARE_DETAIL_IMAGES: &str = "images";

pub const SHARE_DETAILS: &[&str] = &[
    SHARE_DETAIL_SHIPPING,
    SHARE_DETAIL_FINANCIAL,
    SHARE_DETAIL_PURCHASE,
    SHARE_DETAIL_IMAGES,
];

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct VehicleShareToken {
    pub id: i64,
    pub vehicle_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub include_details: Vec<String>,
    pub is_active: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VehicleShareToken {
    pub fn includes(&self, detail: &str) -> bool {
        self.include_details.iter().any(|d| d == detail)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateShareRequest {
    #[schema(example = 7)]
    pub expire_in_days: Option<i64>,
    #[serde(default)]
    #[schema(example = json!(["shipping", "images"]))]
    pub include_details: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShareTokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub include_details: Vec<String>,
    pub share_url: String,
}

// =============================================================================
//  PUBLIC PROJECTION
// =============================================================================
// Only fields safe for anonymous viewers: no internal notes, supplier
// identity, revenue/profit, or customer contact details.

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicVehicleView {
    pub code: i32,
    pub make: String,
    pub model: String,
    pub trim_level: Option<String>,
    pub year_of_manufacture: i32,
    pub color: String,
    pub mileage_km: Option<i32>,
    pub condition_status: ConditionStatus,
    pub auction_grade: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<PublicShipping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial: Option<PublicFinancial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase: Option<PublicPurchase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<PublicImage>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicShipping {
    pub vessel_name: Option<String>,
    pub departure_harbour: Option<String>,
    pub shipment_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
    pub clearing_date: Option<NaiveDate>,
    pub shipping_status: ShippingStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicFinancial {
    pub charges_lkr: Decimal,
    pub duty_lkr: Decimal,
    pub clearing_lkr: Decimal,
    pub total_cost_lkr: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicPurchase {
    pub purchase_date: Option<NaiveDate>,
    pub purchase_status: PurchaseStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicImage {
    pub url: String,
    pub is_primary: bool,
    pub display_order: i32,
}
