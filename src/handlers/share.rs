// src/handlers/share.rs

//! Time-boxed public links to a vehicle.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{PermVehiclesAccess, PermVehiclesEdit, RequirePermission},
    models::{
        auth::CurrentUser,
        share::{CreateShareRequest, PublicVehicleView, ShareTokenResponse, VehicleShareToken},
    },
};

#[utoipa::path(
    post,
    path = "/car-service/api/v1/share/vehicle/{id}",
    tag = "Share",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body = CreateShareRequest,
    responses(
        (status = 201, description = "Share link issued", body = ShareTokenResponse),
        (status = 400, description = "Expiry outside 1..=365 days or unknown detail"),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_share(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermVehiclesAccess>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateShareRequest>,
) -> Result<impl IntoResponse, AppError> {
    let share = app_state.share_service.issue(id, payload, &user).await?;
    Ok((StatusCode::CREATED, Json(share)))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/share/vehicle/{id}",
    tag = "Share",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Every link issued for the vehicle, newest first", body = Vec<VehicleShareToken>),
        (status = 404, description = "Vehicle not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_shares(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let shares = app_state.share_service.list(id).await?;
    Ok(Json(shares))
}

#[utoipa::path(
    delete,
    path = "/car-service/api/v1/share/tokens/{token}",
    tag = "Share",
    params(("token" = String, Path, description = "Share token")),
    responses(
        (status = 200, description = "Link deactivated", body = VehicleShareToken),
        (status = 404, description = "Token not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_share(
    State(app_state): State<AppState>,
    user: CurrentUser,
    _guard: RequirePermission<PermVehiclesEdit>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let share = app_state.share_service.deactivate(&token, &user).await?;
    Ok(Json(share))
}

/// Unauthenticated; only the details chosen when the link was issued are
/// returned.
#[utoipa::path(
    get,
    path = "/car-service/api/v1/share/vehicle/public/{token}",
    tag = "Share",
    params(("token" = String, Path, description = "Share token")),
    responses(
        (status = 200, description = "Public projection of the vehicle", body = PublicVehicleView),
        (status = 404, description = "Link is unknown, inactive or expired")
    )
)]
pub async fn public_share(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = app_state.share_service.consume(&token).await?;
    Ok(Json(view))
}
