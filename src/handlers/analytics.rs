// src/handlers/analytics.rs

//! Dashboard aggregates. Every endpoint accepts an optional
//! `dateRangeStart` / `dateRangeEnd` pair (YYYY-MM-DD, end day inclusive).

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::{
        error::AppError,
        filters::{
            VehicleBrandFilter, VehicleFinancialFilter, VehiclePurchaseFilter, VehicleSalesFilter,
            VehicleShippingFilter,
        },
    },
    config::AppState,
    middleware::rbac::{PermVehiclesAccess, RequirePermission},
    models::analytics::{FinancialSummary, StatusCount},
};

#[utoipa::path(
    get,
    path = "/car-service/api/v1/analytics/shipping-status",
    tag = "Analytics",
    params(
        ("dateRangeStart" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("dateRangeEnd" = Option<String>, Query, description = "Last day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Vehicle count per shipping status", body = Vec<StatusCount>),
        (status = 400, description = "Invalid date range")
    ),
    security(("api_jwt" = []))
)]
pub async fn shipping_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Query(filter): Query<VehicleShippingFilter>,
) -> Result<impl IntoResponse, AppError> {
    let counts = app_state.analytics_service.shipping_status(&filter).await?;
    Ok(Json(counts))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/analytics/purchase-status",
    tag = "Analytics",
    params(
        ("dateRangeStart" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("dateRangeEnd" = Option<String>, Query, description = "Last day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Vehicle count per purchase status", body = Vec<StatusCount>),
        (status = 400, description = "Invalid date range")
    ),
    security(("api_jwt" = []))
)]
pub async fn purchase_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Query(filter): Query<VehiclePurchaseFilter>,
) -> Result<impl IntoResponse, AppError> {
    let counts = app_state.analytics_service.purchase_status(&filter).await?;
    Ok(Json(counts))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/analytics/sales-status",
    tag = "Analytics",
    params(
        ("dateRangeStart" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("dateRangeEnd" = Option<String>, Query, description = "Last day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Vehicle count per sale status", body = Vec<StatusCount>),
        (status = 400, description = "Invalid date range")
    ),
    security(("api_jwt" = []))
)]
pub async fn sales_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Query(filter): Query<VehicleSalesFilter>,
) -> Result<impl IntoResponse, AppError> {
    let counts = app_state.analytics_service.sales_status(&filter).await?;
    Ok(Json(counts))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/analytics/vehicle-brand-status",
    tag = "Analytics",
    params(
        ("dateRangeStart" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("dateRangeEnd" = Option<String>, Query, description = "Last day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Vehicle count keyed by make", body = BTreeMap<String, i64>),
        (status = 400, description = "Invalid date range")
    ),
    security(("api_jwt" = []))
)]
pub async fn vehicle_brand_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Query(filter): Query<VehicleBrandFilter>,
) -> Result<impl IntoResponse, AppError> {
    let brands = app_state.analytics_service.vehicle_brands(&filter).await?;
    Ok(Json(brands))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/analytics/financial-summary",
    tag = "Analytics",
    params(
        ("dateRangeStart" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("dateRangeEnd" = Option<String>, Query, description = "Last day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Cost totals and average across vehicles", body = FinancialSummary),
        (status = 400, description = "Invalid date range")
    ),
    security(("api_jwt" = []))
)]
pub async fn financial_summary(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Query(filter): Query<VehicleFinancialFilter>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.analytics_service.financial_summary(&filter).await?;
    Ok(Json(summary))
}
