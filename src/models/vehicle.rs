// src/models/vehicle.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::enums::{
    ConditionStatus, Currency, PurchaseStatus, SaleStatus, ShippingStatus,
};

// =============================================================================
//  VEHICLE (aggregate root)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Vehicle {
    pub id: i64,
    #[schema(example = 101)]
    pub code: i32,
    #[schema(example = "Toyota")]
    pub make: String,
    #[schema(example = "Aqua")]
    pub model: String,
    pub trim_level: Option<String>,
    #[schema(example = 2018)]
    pub year_of_manufacture: i32,
    #[schema(example = "Pearl")]
    pub color: String,
    pub mileage_km: Option<i32>,
    #[schema(example = "JTNK1")]
    pub chassis_id: String,
    pub condition_status: ConditionStatus,
    pub currency: Currency,
    pub price_quote: Option<Decimal>,
    pub auction_grade: Option<String>,
    pub auction_price: Option<Decimal>,
    pub cif_value: Option<Decimal>,
    pub hs_code: Option<String>,
    pub registration_number: Option<String>,
    pub record_date: Option<NaiveDate>,
    pub internal_notes: Option<String>,
    pub is_featured: bool,
    pub featured_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
//  SIBLING ROWS (1:1 with the vehicle)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VehicleShipping {
    pub id: i64,
    pub vehicle_id: i64,
    pub vessel_name: Option<String>,
    pub departure_harbour: Option<String>,
    pub shipment_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
    pub clearing_date: Option<NaiveDate>,
    pub shipping_status: ShippingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VehicleFinancials {
    pub id: i64,
    pub vehicle_id: i64,
    pub charges_lkr: Decimal,
    pub tt_lkr: Decimal,
    pub duty_lkr: Decimal,
    pub clearing_lkr: Decimal,
    pub other_expenses_lkr: Decimal,
    pub total_cost_lkr: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VehicleSales {
    pub id: i64,
    pub vehicle_id: i64,
    pub customer_id: Option<i64>,
    pub sold_to_name: Option<String>,
    pub sold_to_title: Option<String>,
    pub contact_number: Option<String>,
    pub customer_address: Option<String>,
    pub sold_date: Option<DateTime<Utc>>,
    pub revenue: Option<Decimal>,
    pub profit: Option<Decimal>,
    pub sale_remarks: Option<String>,
    pub sale_status: SaleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VehiclePurchase {
    pub id: i64,
    pub vehicle_id: i64,
    pub supplier_id: Option<i64>,
    pub bought_from_name: Option<String>,
    pub bought_from_title: Option<String>,
    pub bought_from_contact: Option<String>,
    pub bought_from_address: Option<String>,
    pub bought_from_other_contacts: Option<String>,
    pub purchase_remarks: Option<String>,
    pub lc_bank: Option<String>,
    pub lc_number: Option<String>,
    pub lc_cost_jpy: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_status: PurchaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VehicleImage {
    pub id: i64,
    pub vehicle_id: i64,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub is_primary: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A vehicle with every sibling row and its images.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VehicleComplete {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub shipping: Option<VehicleShipping>,
    pub financials: Option<VehicleFinancials>,
    pub sales: Option<VehicleSales>,
    pub purchase: Option<VehiclePurchase>,
    pub images: Vec<VehicleImage>,
}

// =============================================================================
//  REQUESTS
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateVehicleRequest {
    #[schema(example = 101)]
    pub code: i32,
    #[validate(length(min = 1, message = "Make is required"))]
    pub make: String,
    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,
    pub trim_level: Option<String>,
    #[validate(range(min = 1900, max = 2100, message = "Year of manufacture is out of range"))]
    pub year_of_manufacture: i32,
    #[validate(length(min = 1, message = "Color is required"))]
    pub color: String,
    #[validate(range(min = 0, message = "Mileage cannot be negative"))]
    pub mileage_km: Option<i32>,
    #[validate(length(min = 1, message = "Chassis ID is required"))]
    pub chassis_id: String,
    #[schema(example = "UNREGISTERED")]
    pub condition_status: String,
    #[schema(example = "JPY")]
    pub currency: String,
    pub price_quote: Option<Decimal>,
    pub auction_grade: Option<String>,
    pub auction_price: Option<Decimal>,
    pub cif_value: Option<Decimal>,
    pub hs_code: Option<String>,
    pub registration_number: Option<String>,
    pub record_date: Option<NaiveDate>,
    pub internal_notes: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

/// Vehicle update is a full overwrite, same shape as creation.
pub type UpdateVehicleRequest = CreateVehicleRequest;

/// Validated column values handed to the repository.
#[derive(Debug, Clone)]
pub struct VehicleValues {
    pub code: i32,
    pub make: String,
    pub model: String,
    pub trim_level: Option<String>,
    pub year_of_manufacture: i32,
    pub color: String,
    pub mileage_km: Option<i32>,
    pub chassis_id: String,
    pub condition_status: ConditionStatus,
    pub currency: Currency,
    pub price_quote: Option<Decimal>,
    pub auction_grade: Option<String>,
    pub auction_price: Option<Decimal>,
    pub cif_value: Option<Decimal>,
    pub hs_code: Option<String>,
    pub registration_number: Option<String>,
    pub record_date: Option<NaiveDate>,
    pub internal_notes: Option<String>,
    pub is_featured: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FeaturedRequest {
    pub is_featured: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateShippingRequest {
    pub vessel_name: Option<String>,
    pub departure_harbour: Option<String>,
    pub shipment_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
    pub clearing_date: Option<NaiveDate>,
    #[schema(example = "SHIPPED")]
    pub shipping_status: String,
    #[validate(length(max = 1000))]
    pub change_remarks: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ShippingValues {
    pub vessel_name: Option<String>,
    pub departure_harbour: Option<String>,
    pub shipment_date: Option<NaiveDate>,
    pub arrival_date: Option<NaiveDate>,
    pub clearing_date: Option<NaiveDate>,
    pub shipping_status: ShippingStatus,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseRequest {
    pub supplier_id: Option<i64>,
    pub bought_from_name: Option<String>,
    pub bought_from_title: Option<String>,
    pub bought_from_contact: Option<String>,
    pub bought_from_address: Option<String>,
    pub bought_from_other_contacts: Option<String>,
    pub purchase_remarks: Option<String>,
    pub lc_bank: Option<String>,
    pub lc_number: Option<String>,
    pub lc_cost_jpy: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    #[schema(example = "LC_ISSUED")]
    pub purchase_status: String,
    #[validate(length(max = 1000))]
    pub change_remarks: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PurchaseValues {
    pub supplier_id: Option<i64>,
    pub bought_from_name: Option<String>,
    pub bought_from_title: Option<String>,
    pub bought_from_contact: Option<String>,
    pub bought_from_address: Option<String>,
    pub bought_from_other_contacts: Option<String>,
    pub purchase_remarks: Option<String>,
    pub lc_bank: Option<String>,
    pub lc_number: Option<String>,
    pub lc_cost_jpy: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_status: PurchaseStatus,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateFinancialsRequest {
    #[serde(default)]
    pub charges_lkr: Decimal,
    #[serde(default)]
    pub tt_lkr: Decimal,
    #[serde(default)]
    pub duty_lkr: Decimal,
    #[serde(default)]
    pub clearing_lkr: Decimal,
    #[serde(default)]
    pub other_expenses_lkr: Decimal,
    pub total_cost_lkr: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct FinancialValues {
    pub charges_lkr: Decimal,
    pub tt_lkr: Decimal,
    pub duty_lkr: Decimal,
    pub clearing_lkr: Decimal,
    pub other_expenses_lkr: Decimal,
    pub total_cost_lkr: Decimal,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateSalesRequest {
    pub customer_id: Option<i64>,
    pub sold_to_name: Option<String>,
    pub sold_to_title: Option<String>,
    pub contact_number: Option<String>,
    pub customer_address: Option<String>,
    pub sold_date: Option<DateTime<Utc>>,
    pub revenue: Option<Decimal>,
    pub profit: Option<Decimal>,
    pub sale_remarks: Option<String>,
    #[schema(example = "SOLD")]
    pub sale_status: String,
}

#[derive(Debug, Clone)]
pub struct SalesValues {
    pub customer_id: Option<i64>,
    pub sold_to_name: Option<String>,
    pub sold_to_title: Option<String>,
    pub contact_number: Option<String>,
    pub customer_address: Option<String>,
    pub sold_date: Option<DateTime<Utc>>,
    pub revenue: Option<Decimal>,
    pub profit: Option<Decimal>,
    pub sale_remarks: Option<String>,
    pub sale_status: SaleStatus,
}

/// Per-file outcome of an image batch upload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageUploadError {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageUploadResult {
    pub uploaded: Vec<VehicleImage>,
    pub errors: Vec<ImageUploadError>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PresignedUrl {
    pub url: String,
    pub expires_in_seconds: u64,
}
