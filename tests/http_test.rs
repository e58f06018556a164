// Router-level tests that never reach Postgres: the pool is lazy and every
// request below is answered by auth, permission or payload checks first.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use car_service::{
    config::{AppState, Config},
    create_app,
    models::auth::Claims,
    services::storage::MemoryStore,
};

const SECRET: &str = "test-secret";
const API: &str = "/car-service/api/v1";

fn config(extra: &[(&str, &str)]) -> Config {
    let mut pairs = vec![
        ("DB_HOST", "127.0.0.1"),
        ("DB_PORT", "1"),
        ("DB_USER", "cars"),
        ("DB_NAME", "cars"),
    ];
    pairs.extend_from_slice(extra);
    Config::from_lookup(|key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .unwrap()
}

fn app_with(config: Config) -> Router {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database_url)
        .unwrap();
    let state = AppState::build(config, pool, Arc::new(MemoryStore::new())).unwrap();
    create_app(state)
}

fn app() -> Router {
    app_with(config(&[("JWT_SECRET", SECRET)]))
}

fn token(permissions: &[&str]) -> String {
    let claims = Claims {
        sub: "user-1".into(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        email: Some("ops@example.com".into()),
        name: Some("Ops".into()),
        exp: Some((Utc::now().timestamp() + 600) as usize),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(t) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, bearer: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let response = app().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let response = app()
        .oneshot(get(&format!("{}/vehicles", API), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrongly_signed_token_is_unauthorized() {
    let forged = encode(
        &Header::default(),
        &Claims {
            sub: "user-1".into(),
            permissions: vec!["*".into()],
            email: None,
            name: None,
            exp: None,
        },
        &EncodingKey::from_secret(b"another-secret"),
    )
    .unwrap();

    let response = app()
        .oneshot(get(&format!("{}/vehicles", API), Some(&forged)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_permission_is_unauthorized() {
    let jwt = token(&["shipping.access"]);
    let response = app()
        .oneshot(get(&format!("{}/vehicles", API), Some(&jwt)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("vehicles.access"));
}

#[tokio::test]
async fn unknown_sort_field_is_bad_request() {
    let jwt = token(&["vehicles.access"]);
    let response = app()
        .oneshot(get(&format!("{}/vehicles?sort_by=secret_column", API), Some(&jwt)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_analytics_range_is_bad_request() {
    let jwt = token(&["vehicles.access"]);
    let uri = format!(
        "{}/analytics/shipping-status?dateRangeStart=2024-05-10&dateRangeEnd=2024-05-01",
        API
    );
    let response = app().oneshot(get(&uri, Some(&jwt))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sold_without_customer_name_is_bad_request() {
    let jwt = token(&["sales.*"]);
    let request = send_json(
        "PUT",
        &format!("{}/vehicles/1/sales", API),
        &jwt,
        json!({ "sale_status": "SOLD", "revenue": 1500000 }),
    );
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Customer name is required when status is SOLD"
    );
}

#[tokio::test]
async fn share_expiry_beyond_a_year_is_bad_request() {
    let jwt = token(&["vehicles.access"]);
    let request = send_json(
        "POST",
        &format!("{}/share/vehicle/1", API),
        &jwt,
        json!({ "expire_in_days": 400, "include_details": ["shipping"] }),
    );
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn vehicle_payload_is_validated() {
    let jwt = token(&["vehicles.create"]);
    let request = send_json(
        "POST",
        &format!("{}/vehicles", API),
        &jwt,
        json!({
            "code": 1,
            "make": "",
            "model": "Aqua",
            "year_of_manufacture": 2018,
            "color": "White",
            "chassis_id": "NHP10-1234567",
            "condition_status": "REGISTERED",
            "currency": "JPY"
        }),
    );
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["details"]["make"].is_array());
}

#[tokio::test]
async fn introspection_rejection_blocks_the_request() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/introspect")
        .with_status(401)
        .create_async()
        .await;

    let introspection_url = format!("{}/introspect", server.url());
    let app = app_with(config(&[("AUTH_INTROSPECTION_URL", introspection_url.as_str())]));

    let response = app
        .oneshot(get(&format!("{}/vehicles", API), Some(&token(&["*"]))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let response = app()
        .oneshot(get(&format!("{}/docs/openapi.json", API), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["paths"][format!("{}/vehicles", API)].is_object());
}
