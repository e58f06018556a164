// src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::{AppState, API_PREFIX},
    docs::ApiDoc,
    handlers::{analytics, catalog, media, orders, parties, sales, share, status, vehicles},
    middleware::auth::auth_guard,
};

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": env!("CARGO_PKG_NAME") }))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Every route that needs a bearer token, relative to `API_PREFIX`.
fn protected_routes(state: &AppState) -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(media::UPLOAD_BODY_LIMIT);

    Router::new()
        // --- Vehicles ---
        .route("/vehicles", get(vehicles::list_vehicles).post(vehicles::create_vehicle))
        .route(
            "/vehicles/{id}",
            get(vehicles::get_vehicle)
                .put(vehicles::update_vehicle)
                .delete(vehicles::delete_vehicle),
        )
        .route("/vehicles/{id}/featured", patch(vehicles::set_featured))
        // --- Shipping / purchase ---
        .route(
            "/vehicles/{id}/shipping",
            get(status::get_shipping).put(status::update_shipping),
        )
        .route(
            "/vehicles/{id}/shipping/history",
            get(status::get_shipping_history).post(status::add_shipping_history),
        )
        .route(
            "/vehicles/{id}/purchase",
            get(status::get_purchase).put(status::update_purchase),
        )
        .route(
            "/vehicles/{id}/purchase/history",
            get(status::get_purchase_history).post(status::add_purchase_history),
        )
        .route("/history/shipping/recent", get(status::recent_shipping_history))
        .route("/history/shipping/status/{status}", get(status::shipping_history_by_status))
        .route("/history/shipping/current", get(status::current_shipping_statuses))
        .route("/history/purchase/recent", get(status::recent_purchase_history))
        .route("/history/purchase/status/{status}", get(status::purchase_history_by_status))
        .route("/history/purchase/current", get(status::current_purchase_statuses))
        // --- Financials / sales ---
        .route(
            "/vehicles/{id}/financials",
            get(sales::get_financials).put(sales::update_financials),
        )
        .route("/vehicles/{id}/sales", get(sales::get_sales).put(sales::update_sales))
        // --- Media ---
        .route(
            "/vehicles/upload-image/{id}",
            post(media::upload_images)
                .get(media::image_url)
                .layer(upload_limit.clone()),
        )
        .route("/vehicles/{id}/images", get(media::list_images))
        .route("/vehicles/images/{image_id}", delete(media::delete_image))
        .route("/vehicles/images/{image_id}/primary", put(media::set_primary_image))
        .route(
            "/vehicles/{id}/documents",
            get(media::list_documents)
                .post(media::upload_document)
                .layer(upload_limit),
        )
        .route("/vehicles/documents/{doc_id}", delete(media::delete_document))
        // --- Catalog ---
        .route("/makes", get(catalog::list_makes).post(catalog::create_make))
        .route(
            "/makes/{id}",
            get(catalog::get_make)
                .put(catalog::update_make)
                .delete(catalog::delete_make),
        )
        .route("/models", get(catalog::list_models).post(catalog::create_model))
        .route(
            "/models/{id}",
            get(catalog::get_model)
                .put(catalog::update_model)
                .delete(catalog::delete_model),
        )
        // --- Customers / suppliers ---
        .route(
            "/customers",
            get(parties::list_customers).post(parties::create_customer),
        )
        .route("/customers/search", get(parties::search_customers))
        .route(
            "/customers/{id}",
            get(parties::get_customer)
                .put(parties::update_customer)
                .delete(parties::delete_customer),
        )
        .route(
            "/suppliers",
            get(parties::list_suppliers).post(parties::create_supplier),
        )
        .route("/suppliers/search", get(parties::search_suppliers))
        .route(
            "/suppliers/{id}",
            get(parties::get_supplier)
                .put(parties::update_supplier)
                .delete(parties::delete_supplier),
        )
        // --- Orders ---
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/status", put(orders::update_order_status))
        // --- Analytics ---
        .route("/analytics/shipping-status", get(analytics::shipping_status))
        .route("/analytics/purchase-status", get(analytics::purchase_status))
        .route("/analytics/sales-status", get(analytics::sales_status))
        .route("/analytics/vehicle-brand-status", get(analytics::vehicle_brand_status))
        .route("/analytics/financial-summary", get(analytics::financial_summary))
        // --- Share links ---
        .route(
            "/share/vehicle/{id}",
            get(share::list_shares).post(share::create_share),
        )
        .route("/share/tokens/{token}", delete(share::deactivate_share))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), auth_guard))
}

/// Builds the full application router around a ready state.
pub fn create_app(state: AppState) -> Router {
    let api = protected_routes(&state).route(
        "/share/vehicle/public/{token}",
        get(share::public_share),
    );

    Router::new()
        .route("/health", get(health))
        .nest(API_PREFIX, api)
        .merge(
            SwaggerUi::new(format!("{}/docs", API_PREFIX))
                .url(format!("{}/docs/openapi.json", API_PREFIX), ApiDoc::openapi()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.allowed_origins))
        .with_state(state)
}
