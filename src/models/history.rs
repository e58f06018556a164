// src/models/history.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Which sibling aggregate a history row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Shipping,
    Purchase,
}

impl HistoryKind {
    pub fn table(&self) -> &'static str {
        match self {
            HistoryKind::Shipping => "cars.vehicle_shipping_history",
            HistoryKind::Purchase => "cars.vehicle_purchase_history",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HistoryKind::Shipping => "shipping",
            HistoryKind::Purchase => "purchase",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StatusHistory {
    pub id: i64,
    pub vehicle_id: i64,
    pub old_status: Option<String>,
    pub new_status: String,
    pub changed_by: Option<String>,
    pub change_remarks: Option<String>,
    pub changed_at: DateTime<Utc>,
    /// Hours the vehicle spent in the previous status; null for the first row.
    pub hours_in_previous_status: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub vehicle_id: i64,
    pub old_status: Option<String>,
    pub new_status: String,
    pub changed_by: Option<String>,
    pub change_remarks: Option<String>,
    pub changed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ManualHistoryRequest {
    pub old_status: Option<String>,
    pub new_status: String,
    #[validate(length(max = 1000))]
    pub change_remarks: Option<String>,
    /// Backdated entries are allowed; defaults to now.
    pub changed_at: Option<DateTime<Utc>>,
}
