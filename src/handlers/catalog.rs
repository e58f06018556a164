// src/handlers/catalog.rs

//! Vehicle makes and models master data.

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
    middleware::rbac::{PermVehiclesAccess, PermVehiclesEdit, RequirePermission},
    models::catalog::{MakeRequest, ModelRequest, VehicleMake, VehicleModel},
};

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub make_id: Option<i64>,
    #[serde(default)]
    pub only_active: bool,
}

// ---
// MAKES
// ---

#[utoipa::path(
    get,
    path = "/car-service/api/v1/makes",
    tag = "Catalog",
    params(("only_active" = Option<bool>, Query, description = "Hide inactive makes")),
    responses((status = 200, description = "Makes ordered by name", body = Vec<VehicleMake>)),
    security(("api_jwt" = []))
)]
pub async fn list_makes(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let makes = app_state.catalog_service.list_makes(query.only_active).await?;
    Ok(Json(makes))
}

#[utoipa::path(
    post,
    path = "/car-service/api/v1/makes",
    tag = "Catalog",
    request_body = MakeRequest,
    responses(
        (status = 201, description = "Make created", body = VehicleMake),
        (status = 409, description = "Make already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_make(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesEdit>,
    Json(payload): Json<MakeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let make = app_state.catalog_service.create_make(payload).await?;
    Ok((StatusCode::CREATED, Json(make)))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/makes/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "Make ID")),
    responses(
        (status = 200, description = "Make", body = VehicleMake),
        (status = 404, description = "Make not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_make(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let make = app_state.catalog_service.get_make(id).await?;
    Ok(Json(make))
}

#[utoipa::path(
    put,
    path = "/car-service/api/v1/makes/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "Make ID")),
    request_body = MakeRequest,
    responses(
        (status = 200, description = "Make updated", body = VehicleMake),
        (status = 404, description = "Make not found"),
        (status = 409, description = "Make already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_make(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<MakeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let make = app_state.catalog_service.update_make(id, payload).await?;
    Ok(Json(make))
}

#[utoipa::path(
    delete,
    path = "/car-service/api/v1/makes/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "Make ID")),
    responses(
        (status = 204, description = "Make deleted"),
        (status = 404, description = "Make not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_make(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesEdit>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalog_service.delete_make(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// MODELS
// ---

#[utoipa::path(
    get,
    path = "/car-service/api/v1/models",
    tag = "Catalog",
    params(
        ("make_id" = Option<i64>, Query, description = "Only models of this make"),
        ("only_active" = Option<bool>, Query, description = "Hide inactive models")
    ),
    responses((status = 200, description = "Models ordered by name", body = Vec<VehicleModel>)),
    security(("api_jwt" = []))
)]
pub async fn list_models(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let models = app_state
        .catalog_service
        .list_models(query.make_id, query.only_active)
        .await?;
    Ok(Json(models))
}

#[utoipa::path(
    post,
    path = "/car-service/api/v1/models",
    tag = "Catalog",
    request_body = ModelRequest,
    responses(
        (status = 201, description = "Model created", body = VehicleModel),
        (status = 404, description = "Make not found"),
        (status = 409, description = "Model already exists for this make")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_model(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesEdit>,
    Json(payload): Json<ModelRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let model = app_state.catalog_service.create_model(payload).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

#[utoipa::path(
    get,
    path = "/car-service/api/v1/models/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "Model ID")),
    responses(
        (status = 200, description = "Model", body = VehicleModel),
        (status = 404, description = "Model not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_model(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesAccess>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let model = app_state.catalog_service.get_model(id).await?;
    Ok(Json(model))
}

#[utoipa::path(
    put,
    path = "/car-service/api/v1/models/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "Model ID")),
    request_body = ModelRequest,
    responses(
        (status = 200, description = "Model updated", body = VehicleModel),
        (status = 404, description = "Model or make not found"),
        (status = 409, description = "Model already exists for this make")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_model(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<ModelRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let model = app_state.catalog_service.update_model(id, payload).await?;
    Ok(Json(model))
}

#[utoipa::path(
    delete,
    path = "/car-service/api/v1/models/{id}",
    tag = "Catalog",
    params(("id" = i64, Path, description = "Model ID")),
    responses(
        (status = 204, description = "Model deleted"),
        (status = 404, description = "Model not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_model(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermVehiclesEdit>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalog_service.delete_model(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
