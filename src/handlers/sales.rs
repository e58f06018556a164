// src/handlers/sales.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{
        PermFinancialAccess, PermFinancialEdit, PermSalesAccess, PermSalesEdit, RequirePermission,
    },
    models::{
        auth::CurrentUser,
        vehicle::{UpdateFinancialsRequest, UpdateSalesRequest, VehicleFinancials, VehicleSales},
    },
};

#[utoipa::path(
    get,
    path = "/car-service/api/v1/vehicles/{id}/financials",
    tag = "Financials",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Cost breakdown in LKR", body = VehicleFinancials),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_financials(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermFinancialAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let financials = app_state.sales_service.get_financials(id).await?;
    Ok(Json(financials))
}

#[utoipa::path(
    put,
    path = "/car-service/api/v1/vehicles/{id}/financials",
    tag = "Financials",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body = UpdateFinancialsRequest,
    responses(
        (status = 200, description = "Financials updated; total defaults to the sum of components", body = VehicleFinancials),
        (status = 400, description = "Negative component or non-positive total"),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_financials(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermFinancialEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateFinancialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let financials = app_state
        .sales_service
        .update_financials(id, payload, &user)
        .await?;
    Ok(Json(financials))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/vehicles/{id}/sales",
    tag = "Sales",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Sales record", body = VehicleSales),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sales(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSalesAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let sales = app_state.sales_service.get_sales(id).await?;
    Ok(Json(sales))
}

#[utoipa::path(
    put,
    path = "/car-service/api/v1/vehicles/{id}/sales",
    tag = "Sales",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body = UpdateSalesRequest,
    responses(
        (status = 200, description = "Sales record updated", body = VehicleSales),
        (status = 400, description = "SOLD without customer name or revenue, or unknown status"),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_sales(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermSalesEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSalesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let sales = app_state.sales_service.update_sales(id, payload, &user).await?;
    Ok(Json(sales))
}
