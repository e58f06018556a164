// src/models/order.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::enums::{OrderPriority, OrderStatus, ShippingMethod};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CustomerOrder {
    pub id: i64,
    #[schema(example = "ORD-1718000000-42")]
    pub order_number: String,
    pub customer_id: i64,
    pub preferred_make: Option<String>,
    pub preferred_model: Option<String>,
    pub preferred_year_min: Option<i32>,
    pub preferred_year_max: Option<i32>,
    pub preferred_color: Option<String>,
    pub max_mileage_km: Option<i32>,
    pub preferred_condition: Option<String>,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    /// JSON array text, e.g. `["sunroof","leather"]`.
    pub features: Option<String>,
    pub priority: OrderPriority,
    pub shipping_method: ShippingMethod,
    pub expected_delivery_date: Option<NaiveDate>,
    pub additional_notes: Option<String>,
    pub order_status: OrderStatus,
    pub is_draft: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    pub customer_title: Option<String>,
    #[validate(length(min = 1, message = "Contact number is required"))]
    pub contact_number: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub preferred_make: Option<String>,
    pub preferred_model: Option<String>,
    pub preferred_year_min: Option<i32>,
    pub preferred_year_max: Option<i32>,
    pub preferred_color: Option<String>,
    pub max_mileage_km: Option<i32>,
    pub preferred_condition: Option<String>,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    #[serde(default)]
    pub features: Vec<String>,
    #[schema(example = "NORMAL")]
    pub priority: Option<String>,
    #[schema(example = "SEA")]
    pub shipping_method: Option<String>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub additional_notes: Option<String>,
    #[serde(default)]
    pub is_draft: bool,
}

#[derive(Debug, Clone)]
pub struct OrderValues {
    pub order_number: String,
    pub customer_id: i64,
    pub preferred_make: Option<String>,
    pub preferred_model: Option<String>,
    pub preferred_year_min: Option<i32>,
    pub preferred_year_max: Option<i32>,
    pub preferred_color: Option<String>,
    pub max_mileage_km: Option<i32>,
    pub preferred_condition: Option<String>,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub features: String,
    pub priority: OrderPriority,
    pub shipping_method: ShippingMethod,
    pub expected_delivery_date: Option<NaiveDate>,
    pub additional_notes: Option<String>,
    pub order_status: OrderStatus,
    pub is_draft: bool,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[schema(example = "REVIEWING")]
    pub order_status: String,
}
