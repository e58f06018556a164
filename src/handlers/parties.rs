// src/handlers/parties.rs

//! Customers (sales side) and suppliers (purchase side).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        filters::{CustomerFilter, SupplierFilter},
        pagination::{PageParams, Paginated},
    },
    config::AppState,
    middleware::rbac::{
        PermPurchaseAccess, PermPurchaseEdit, PermSalesAccess, PermSalesEdit, RequirePermission,
    },
    models::{
        auth::CurrentUser,
        customer::{Customer, CustomerRequest},
        supplier::{Supplier, SupplierRequest},
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

// ---
// CUSTOMERS
// ---

#[utoipa::path(
    get,
    path = "/car-service/api/v1/customers",
    tag = "Customers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("limit" = Option<i64>, Query, description = "Page size, max 100"),
        ("search" = Option<String>, Query, description = "Matches the name"),
        ("customer_type" = Option<String>, Query, description = "INDIVIDUAL or BUSINESS"),
        ("is_active" = Option<bool>, Query, description = "Defaults to active customers"),
        ("sort_by" = Option<String>, Query, description = "id, name, customer_type or created_at"),
        ("sort_order" = Option<String>, Query, description = "asc or desc")
    ),
    responses(
        (status = 200, description = "Page of customers", body = Paginated<Customer>),
        (status = 400, description = "Invalid filter")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSalesAccess>,
    Query(filter): Query<CustomerFilter>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state.customer_service.list(&filter, page).await?;
    Ok(Json(customers))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/customers/search",
    tag = "Customers",
    params(("q" = String, Query, description = "Name, contact number or email fragment")),
    responses(
        (status = 200, description = "Up to 20 matching active customers", body = Vec<Customer>),
        (status = 400, description = "Empty search term")
    ),
    security(("api_jwt" = []))
)]
pub async fn search_customers(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSalesAccess>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state.customer_service.search(&query.q).await?;
    Ok(Json(customers))
}

#[utoipa::path(
    post,
    path = "/car-service/api/v1/customers",
    tag = "Customers",
    request_body = CustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Contact number already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermSalesEdit>,
    Json(payload): Json<CustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let customer = app_state.customer_service.create(payload, &user).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/customers/{id}",
    tag = "Customers",
    params(("id" = i64, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer", body = Customer),
        (status = 404, description = "Customer not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSalesAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state.customer_service.get_by_id(id).await?;
    Ok(Json(customer))
}

#[utoipa::path(
    put,
    path = "/car-service/api/v1/customers/{id}",
    tag = "Customers",
    params(("id" = i64, Path, description = "Customer ID")),
    request_body = CustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 404, description = "Customer not found"),
        (status = 409, description = "Contact number already in use")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermSalesEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let customer = app_state.customer_service.update(id, payload, &user).await?;
    Ok(Json(customer))
}

#[utoipa::path(
    delete,
    path = "/car-service/api/v1/customers/{id}",
    tag = "Customers",
    params(("id" = i64, Path, description = "Customer ID")),
    responses(
        (status = 204, description = "Customer deactivated"),
        (status = 404, description = "Customer not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermSalesEdit>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.customer_service.delete(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// SUPPLIERS
// ---

#[utoipa::path(
    get,
    path = "/car-service/api/v1/suppliers",
    tag = "Suppliers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("limit" = Option<i64>, Query, description = "Page size, max 100"),
        ("search" = Option<String>, Query, description = "Matches the name"),
        ("supplier_type" = Option<String>, Query, description = "AUCTION, DEALER or INDIVIDUAL"),
        ("country" = Option<String>, Query, description = "Exact country"),
        ("is_active" = Option<bool>, Query, description = "Defaults to active suppliers"),
        ("sort_by" = Option<String>, Query, description = "id, name, supplier_type, country or created_at"),
        ("sort_order" = Option<String>, Query, description = "asc or desc")
    ),
    responses(
        (status = 200, description = "Page of suppliers", body = Paginated<Supplier>),
        (status = 400, description = "Invalid filter")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermPurchaseAccess>,
    Query(filter): Query<SupplierFilter>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let suppliers = app_state.supplier_service.list(&filter, page).await?;
    Ok(Json(suppliers))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/suppliers/search",
    tag = "Suppliers",
    params(("q" = String, Query, description = "Name, contact number or email fragment")),
    responses(
        (status = 200, description = "Up to 20 matching active suppliers", body = Vec<Supplier>),
        (status = 400, description = "Empty search term")
    ),
    security(("api_jwt" = []))
)]
pub async fn search_suppliers(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermPurchaseAccess>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let suppliers = app_state.supplier_service.search(&query.q).await?;
    Ok(Json(suppliers))
}

#[utoipa::path(
    post,
    path = "/car-service/api/v1/suppliers",
    tag = "Suppliers",
    request_body = SupplierRequest,
    responses(
        (status = 201, description = "Supplier created", body = Supplier),
        (status = 400, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermPurchaseEdit>,
    Json(payload): Json<SupplierRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let supplier = app_state.supplier_service.create(payload, &user).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = i64, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier", body = Supplier),
        (status = 404, description = "Supplier not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_supplier(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermPurchaseAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let supplier = app_state.supplier_service.get_by_id(id).await?;
    Ok(Json(supplier))
}

#[utoipa::path(
    put,
    path = "/car-service/api/v1/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = i64, Path, description = "Supplier ID")),
    request_body = SupplierRequest,
    responses(
        (status = 200, description = "Supplier updated", body = Supplier),
        (status = 404, description = "Supplier not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermPurchaseEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<SupplierRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let supplier = app_state.supplier_service.update(id, payload, &user).await?;
    Ok(Json(supplier))
}

#[utoipa::path(
    delete,
    path = "/car-service/api/v1/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = i64, Path, description = "Supplier ID")),
    responses(
        (status = 204, description = "Supplier deactivated"),
        (status = 404, description = "Supplier not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_supplier(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermPurchaseEdit>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.supplier_service.delete(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
