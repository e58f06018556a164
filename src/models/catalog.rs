// src/models/catalog.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VehicleMake {
    pub id: i64,
    #[schema(example = "Toyota")]
    pub make_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VehicleModel {
    pub id: i64,
    pub make_id: i64,
    #[schema(example = "Aqua")]
    pub model_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MakeRequest {
    #[validate(length(min = 1, max = 100, message = "Make name is required"))]
    pub make_name: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ModelRequest {
    pub make_id: i64,
    #[validate(length(min = 1, max = 100, message = "Model name is required"))]
    pub model_name: String,
    pub is_active: Option<bool>,
}
