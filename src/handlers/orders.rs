// src/handlers/orders.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        filters::OrderFilter,
        pagination::{PageParams, Paginated},
    },
    config::AppState,
    middleware::rbac::{PermSalesAccess, PermSalesEdit, RequirePermission},
    models::{
        auth::CurrentUser,
        order::{CreateOrderRequest, CustomerOrder, UpdateOrderStatusRequest},
    },
};

#[utoipa::path(
    post,
    path = "/car-service/api/v1/orders",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order recorded as DRAFT or SUBMITTED; the customer is matched by contact number or created", body = CustomerOrder),
        (status = 400, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermSalesEdit>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let order = app_state.order_service.submit(payload, &user).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/orders",
    tag = "Orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("limit" = Option<i64>, Query, description = "Page size, max 100"),
        ("order_status" = Option<String>, Query, description = "Order status"),
        ("customer_id" = Option<i64>, Query, description = "Orders of one customer"),
        ("priority" = Option<String>, Query, description = "LOW, NORMAL, HIGH or URGENT")
    ),
    responses(
        (status = 200, description = "Page of orders, newest first", body = Paginated<CustomerOrder>),
        (status = 400, description = "Invalid filter")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSalesAccess>,
    Query(filter): Query<OrderFilter>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.order_service.list(&filter, page).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/orders/{id}",
    tag = "Orders",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = CustomerOrder),
        (status = 404, description = "Order not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSalesAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.get_by_id(id).await?;
    Ok(Json(order))
}

#[utoipa::path(
    put,
    path = "/car-service/api/v1/orders/{id}/status",
    tag = "Orders",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status changed", body = CustomerOrder),
        (status = 400, description = "Unknown order status"),
        (status = 404, description = "Order not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermSalesEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.update_status(id, payload, &user).await?;
    Ok(Json(order))
}
