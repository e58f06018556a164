// src/models/supplier.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::enums::SupplierType;

pub const DEFAULT_SUPPLIER_COUNTRY: &str = "Japan";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Supplier {
    pub id: i64,
    #[schema(example = "USS Tokyo")]
    pub name: String,
    pub title: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub other_contacts: Option<String>,
    pub supplier_type: SupplierType,
    pub country: String,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SupplierRequest {
    #[validate(length(min = 1, message = "Supplier name is required"))]
    pub name: String,
    pub title: Option<String>,
    pub contact_number: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub other_contacts: Option<String>,
    #[schema(example = "AUCTION")]
    pub supplier_type: String,
    pub country: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SupplierValues {
    pub name: String,
    pub title: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub other_contacts: Option<String>,
    pub supplier_type: SupplierType,
    pub country: String,
    pub notes: Option<String>,
}
