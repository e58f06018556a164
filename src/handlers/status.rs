// src/handlers/status.rs

//! Shipping and purchase records, their transitions and history.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{
        PermPurchaseAccess, PermPurchaseEdit, PermShippingAccess, PermShippingEdit,
        RequirePermission,
    },
    models::{
        auth::CurrentUser,
        history::{HistoryKind, ManualHistoryRequest, StatusHistory},
        vehicle::{UpdatePurchaseRequest, UpdateShippingRequest, VehiclePurchase, VehicleShipping},
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

// ---
// SHIPPING
// ---

#[utoipa::path(
    get,
    path = "/car-service/api/v1/vehicles/{id}/shipping",
    tag = "Shipping",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Shipping record", body = VehicleShipping),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_shipping(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermShippingAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let shipping = app_state.status_service.get_shipping(id).await?;
    Ok(Json(shipping))
}

#[utoipa::path(
    put,
    path = "/car-service/api/v1/vehicles/{id}/shipping",
    tag = "Shipping",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body = UpdateShippingRequest,
    responses(
        (status = 200, description = "Shipping record updated; a status change is recorded in history", body = VehicleShipping),
        (status = 400, description = "Invalid shipping status"),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_shipping(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermShippingEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateShippingRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let shipping = app_state.status_service.update_shipping(id, payload, &user).await?;
    Ok(Json(shipping))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/vehicles/{id}/shipping/history",
    tag = "Shipping",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses((status = 200, description = "Shipping status history, oldest first", body = Vec<StatusHistory>)),
    security(("api_jwt" = []))
)]
pub async fn get_shipping_history(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermShippingAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let history = app_state.status_service.vehicle_history(HistoryKind::Shipping, id).await?;
    Ok(Json(history))
}

#[utoipa::path(
    post,
    path = "/car-service/api/v1/vehicles/{id}/shipping/history",
    tag = "Shipping",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body = ManualHistoryRequest,
    responses(
        (status = 201, description = "History entry recorded", body = StatusHistory),
        (status = 400, description = "Invalid status")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_shipping_history(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermShippingEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<ManualHistoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let entry = app_state
        .status_service
        .add_manual_entry(HistoryKind::Shipping, id, payload, &user)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/history/shipping/recent",
    tag = "Shipping",
    params(("limit" = Option<i64>, Query, description = "Rows to return (default 50)")),
    responses((status = 200, description = "Latest shipping transitions across vehicles", body = Vec<StatusHistory>)),
    security(("api_jwt" = []))
)]
pub async fn recent_shipping_history(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermShippingAccess>,
    Query(query): Query<RecentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let history = app_state
        .status_service
        .recent_history(HistoryKind::Shipping, query.limit)
        .await?;
    Ok(Json(history))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/history/shipping/status/{status}",
    tag = "Shipping",
    params(("status" = String, Path, description = "Shipping status")),
    responses(
        (status = 200, description = "Transitions into the given status", body = Vec<StatusHistory>),
        (status = 400, description = "Invalid status")
    ),
    security(("api_jwt" = []))
)]
pub async fn shipping_history_by_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermShippingAccess>,
    Path(status): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let history = app_state
        .status_service
        .history_by_status(HistoryKind::Shipping, &status)
        .await?;
    Ok(Json(history))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/history/shipping/current",
    tag = "Shipping",
    responses((status = 200, description = "Latest shipping transition per vehicle", body = Vec<StatusHistory>)),
    security(("api_jwt" = []))
)]
pub async fn current_shipping_statuses(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermShippingAccess>,
) -> Result<impl IntoResponse, AppError> {
    let history = app_state.status_service.current_statuses(HistoryKind::Shipping).await?;
    Ok(Json(history))
}

// ---
// PURCHASE
// ---

#[utoipa::path(
    get,
    path = "/car-service/api/v1/vehicles/{id}/purchase",
    tag = "Purchase",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Purchase record", body = VehiclePurchase),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_purchase(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermPurchaseAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let purchase = app_state.status_service.get_purchase(id).await?;
    Ok(Json(purchase))
}

#[utoipa::path(
    put,
    path = "/car-service/api/v1/vehicles/{id}/purchase",
    tag = "Purchase",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body = UpdatePurchaseRequest,
    responses(
        (status = 200, description = "Purchase record updated; a status change is recorded in history", body = VehiclePurchase),
        (status = 400, description = "Invalid purchase status or unknown supplier"),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_purchase(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermPurchaseEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePurchaseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let purchase = app_state.status_service.update_purchase(id, payload, &user).await?;
    Ok(Json(purchase))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/vehicles/{id}/purchase/history",
    tag = "Purchase",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses((status = 200, description = "Purchase status history, oldest first", body = Vec<StatusHistory>)),
    security(("api_jwt" = []))
)]
pub async fn get_purchase_history(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermPurchaseAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let history = app_state.status_service.vehicle_history(HistoryKind::Purchase, id).await?;
    Ok(Json(history))
}

#[utoipa::path(
    post,
    path = "/car-service/api/v1/vehicles/{id}/purchase/history",
    tag = "Purchase",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body = ManualHistoryRequest,
    responses(
        (status = 201, description = "History entry recorded", body = StatusHistory),
        (status = 400, description = "Invalid status")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_purchase_history(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermPurchaseEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<ManualHistoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let entry = app_state
        .status_service
        .add_manual_entry(HistoryKind::Purchase, id, payload, &user)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/history/purchase/recent",
    tag = "Purchase",
    params(("limit" = Option<i64>, Query, description = "Rows to return (default 50)")),
    responses((status = 200, description = "Latest purchase transitions across vehicles", body = Vec<StatusHistory>)),
    security(("api_jwt" = []))
)]
pub async fn recent_purchase_history(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermPurchaseAccess>,
    Query(query): Query<RecentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let history = app_state
        .status_service
        .recent_history(HistoryKind::Purchase, query.limit)
        .await?;
    Ok(Json(history))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/history/purchase/status/{status}",
    tag = "Purchase",
    params(("status" = String, Path, description = "Purchase status")),
    responses(
        (status = 200, description = "Transitions into the given status", body = Vec<StatusHistory>),
        (status = 400, description = "Invalid status")
    ),
    security(("api_jwt" = []))
)]
pub async fn purchase_history_by_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermPurchaseAccess>,
    Path(status): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let history = app_state
        .status_service
        .history_by_status(HistoryKind::Purchase, &status)
        .await?;
    Ok(Json(history))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/history/purchase/current",
    tag = "Purchase",
    responses((status = 200, description = "Latest purchase transition per vehicle", body = Vec<StatusHistory>)),
    security(("api_jwt" = []))
)]
pub async fn current_purchase_statuses(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermPurchaseAccess>,
) -> Result<impl IntoResponse, AppError> {
    let history = app_state.status_service.current_statuses(HistoryKind::Purchase).await?;
    Ok(Json(history))
}
