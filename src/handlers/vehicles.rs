// src/handlers/vehicles.rs

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
        filters::VehicleFilter,
        pagination::{PageParams, Paginated},
    },
    config::AppState,
    middleware::rbac::{PermVehiclesAccess, PermVehiclesCreate, PermVehiclesEdit, RequirePermission},
    models::{
        auth::CurrentUser,
        vehicle::{CreateVehicleRequest, FeaturedRequest, UpdateVehicleRequest, Vehicle, VehicleComplete},
    },
};

#[utoipa::path(
    get,
    path = "/car-service/api/v1/vehicles",
    tag = "Vehicles",
    params(
        ("page" = Option<i64>, Query, description = "Page number, from 1"),
        ("limit" = Option<i64>, Query, description = "Page size, max 100"),
        ("make" = Option<String>, Query, description = "Exact make"),
        ("model" = Option<String>, Query, description = "Exact model"),
        ("search" = Option<String>, Query, description = "Matches make, model and chassis ID"),
        ("shipping_status" = Option<String>, Query, description = "Shipping status"),
        ("sale_status" = Option<String>, Query, description = "Sale status"),
        ("sort_by" = Option<String>, Query, description = "Sort field"),
        ("sort_order" = Option<String>, Query, description = "asc or desc")
    ),
    responses(
        (status = 200, description = "Page of vehicles with their details", body = Paginated<VehicleComplete>),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Not authorized")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_vehicles(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Query(filter): Query<VehicleFilter>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let vehicles = app_state.vehicle_service.list(&filter, page).await?;
    Ok(Json(vehicles))
}

#[utoipa::path(
    post,
    path = "/car-service/api/v1/vehicles",
    tag = "Vehicles",
    request_body = CreateVehicleRequest,
    responses(
        (status = 201, description = "Vehicle created with default shipping, financial, sales and purchase records", body = VehicleComplete),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Chassis ID already registered")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_vehicle(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermVehiclesCreate>,
    Json(payload): Json<CreateVehicleRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let vehicle = app_state.vehicle_service.create(payload, &user).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle with every detail record", body = VehicleComplete),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_vehicle(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let vehicle = app_state.vehicle_service.get_by_id(id).await?;
    Ok(Json(vehicle))
}

#[utoipa::path(
    put,
    path = "/car-service/api/v1/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body = CreateVehicleRequest,
    responses(
        (status = 200, description = "Vehicle updated", body = Vehicle),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Vehicle not found"),
        (status = 409, description = "Chassis ID already registered")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_vehicle(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermVehiclesEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let vehicle = app_state.vehicle_service.update(id, payload, &user).await?;
    Ok(Json(vehicle))
}

#[utoipa::path(
    delete,
    path = "/car-service/api/v1/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 204, description = "Vehicle and its records deleted"),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_vehicle(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermVehiclesEdit>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.vehicle_service.delete(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/car-service/api/v1/vehicles/{id}/featured",
    tag = "Vehicles",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body = FeaturedRequest,
    responses(
        (status = 200, description = "Featured flag updated", body = Vehicle),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_featured(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermVehiclesEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<FeaturedRequest>,
) -> Result<impl IntoResponse, AppError> {
    let vehicle = app_state
        .vehicle_service
        .set_featured(id, payload.is_featured, &user)
        .await?;
    Ok(Json(vehicle))
}
