// src/models/customer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::enums::CustomerType;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Customer {
    pub id: i64,
    #[schema(example = "Nimal Perera")]
    pub name: String,
    pub title: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub other_contacts: Option<String>,
    pub customer_type: CustomerType,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CustomerRequest {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub name: String,
    pub title: Option<String>,
    pub contact_number: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub other_contacts: Option<String>,
    #[schema(example = "INDIVIDUAL")]
    pub customer_type: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CustomerValues {
    pub name: String,
    pub title: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub other_contacts: Option<String>,
    pub customer_type: CustomerType,
    pub notes: Option<String>,
}
