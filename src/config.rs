// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::services::{
    analytics_service::AnalyticsService,
    auth::AuthService,
    catalog_service::CatalogService,
    email::EmailService,
    media_service::MediaService,
    notification::NotificationService,
    order_service::OrderService,
    party_service::{CustomerService, SupplierService},
    sales_service::SalesService,
    share_service::ShareService,
    status_service::StatusService,
    storage::{MemoryStore, ObjectStore, SpacesConfig, SpacesStore},
    vehicle_service::VehicleService,
};

pub const API_PREFIX: &str = "/car-service/api/v1";
pub const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub auth_introspection_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub email_service_url: Option<String>,
    pub notification_service_url: Option<String>,
    pub spaces: Option<SpacesConfig>,
    pub run_migrations: bool,
    pub public_share_base_url: String,
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, name: &str, default: T) -> anyhow::Result<T> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value '{}'", name, value)),
        None => Ok(default),
    }
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    if raw.trim() == "*" {
        return Vec::new();
    }
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| get(key).with_context(|| format!("{} must be set", key));

        let database_url = format!(
            "postgres://{}:{}@{}:{}/{}?sslmode=disable",
            require("DB_USER")?,
            get("DB_PASSWORD").unwrap_or_default(),
            require("DB_HOST")?,
            parse_or(get("DB_PORT"), "DB_PORT", 5432u16)?,
            require("DB_NAME")?,
        );

        let auth_introspection_url = get("AUTH_INTROSPECTION_URL");
        let jwt_secret = get("JWT_SECRET");
        if auth_introspection_url.is_none() && jwt_secret.is_none() {
            anyhow::bail!("AUTH_INTROSPECTION_URL or JWT_SECRET must be set");
        }

        let spaces = match (get("SPACES_KEY"), get("SPACES_SECRET"), get("SPACES_BUCKET")) {
            (Some(key), Some(secret), Some(bucket)) => Some(SpacesConfig {
                key,
                secret,
                region: get("SPACES_REGION").unwrap_or_else(|| "sgp1".to_string()),
                bucket,
                endpoint: get("SPACES_ENDPOINT"),
            }),
            _ => None,
        };

        let environment = get("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        if spaces.is_none() && environment.eq_ignore_ascii_case("production") {
            anyhow::bail!("SPACES_KEY, SPACES_SECRET and SPACES_BUCKET must be set in production");
        }

        Ok(Self {
            port: parse_or(get("PORT"), "PORT", 8080u16)?,
            environment,
            allowed_origins: parse_origins(&get("ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string())),
            database_url,
            db_max_connections: parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 10u32)?,
            auth_introspection_url,
            jwt_secret,
            email_service_url: get("EMAIL_SERVICE_URL"),
            notification_service_url: get("NOTIFICATION_SERVICE_URL"),
            spaces,
            run_migrations: parse_or(get("RUN_MIGRATIONS"), "RUN_MIGRATIONS", false)?,
            public_share_base_url: get("PUBLIC_SHARE_BASE_URL").unwrap_or_else(|| API_PREFIX.to_string()),
        })
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub vehicle_service: VehicleService,
    pub status_service: StatusService,
    pub sales_service: SalesService,
    pub media_service: MediaService,
    pub share_service: ShareService,
    pub customer_service: CustomerService,
    pub supplier_service: SupplierService,
    pub order_service: OrderService,
    pub catalog_service: CatalogService,
    pub analytics_service: AnalyticsService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Config::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("failed to connect to the database")?;

        tracing::info!(max_connections = config.db_max_connections, "database pool ready");

        let store: Arc<dyn ObjectStore> = match &config.spaces {
            Some(spaces) => Arc::new(SpacesStore::new(spaces)),
            None => {
                tracing::warn!(environment = %config.environment, "SPACES_* not configured, keeping uploads in memory");
                Arc::new(MemoryStore::new())
            }
        };

        Self::build(config, db_pool, store)
    }

    /// Wires repositories and services around an existing pool and store.
    pub fn build(config: Config, db_pool: PgPool, store: Arc<dyn ObjectStore>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(OUTBOUND_TIMEOUT)
            .build()
            .context("failed to build the HTTP client")?;

        let notifier = NotificationService::new(http.clone(), config.notification_service_url.clone());
        let email = EmailService::new(http.clone(), config.email_service_url.clone());
        if !notifier.is_enabled() {
            tracing::info!("NOTIFICATION_SERVICE_URL not set, notifications disabled");
        }

        let auth_service = AuthService::new(
            http,
            config.auth_introspection_url.clone(),
            config.jwt_secret.clone(),
        );

        Ok(Self {
            auth_service,
            vehicle_service: VehicleService::new(db_pool.clone(), store.clone(), notifier.clone()),
            status_service: StatusService::new(db_pool.clone(), notifier.clone(), email),
            sales_service: SalesService::new(db_pool.clone(), notifier.clone()),
            media_service: MediaService::new(db_pool.clone(), store.clone(), notifier.clone()),
            share_service: ShareService::new(
                db_pool.clone(),
                store,
                notifier.clone(),
                config.public_share_base_url.clone(),
            ),
            customer_service: CustomerService::new(db_pool.clone(), notifier.clone()),
            supplier_service: SupplierService::new(db_pool.clone(), notifier.clone()),
            order_service: OrderService::new(db_pool.clone(), notifier),
            catalog_service: CatalogService::new(db_pool.clone()),
            analytics_service: AnalyticsService::new(db_pool.clone()),
            config: Arc::new(config),
            db_pool,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("DB_HOST", "db"),
        ("DB_USER", "cars"),
        ("DB_PASSWORD", "secret"),
        ("DB_NAME", "cars"),
        ("AUTH_INTROSPECTION_URL", "http://auth/introspect"),
    ];

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(BASE)).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "development");
        assert_eq!(config.database_url, "postgres://cars:secret@db:5432/cars?sslmode=disable");
        assert_eq!(config.db_max_connections, 10);
        assert!(config.allowed_origins.is_empty());
        assert!(config.spaces.is_none());
        assert!(!config.run_migrations);
        assert_eq!(config.public_share_base_url, API_PREFIX);
    }

    #[test]
    fn spaces_need_key_secret_and_bucket() {
        let mut pairs = BASE.to_vec();
        pairs.extend([("SPACES_KEY", "k"), ("SPACES_SECRET", "s"), ("SPACES_BUCKET", "cars")]);
        let spaces = Config::from_lookup(lookup(&pairs)).unwrap().spaces.unwrap();
        assert_eq!(spaces.region, "sgp1");
        assert_eq!(spaces.bucket, "cars");
    }

    #[test]
    fn production_requires_object_storage() {
        let mut pairs = BASE.to_vec();
        pairs.push(("ENVIRONMENT", "production"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("SPACES_BUCKET"));

        pairs.extend([("SPACES_KEY", "k"), ("SPACES_SECRET", "s"), ("SPACES_BUCKET", "cars")]);
        assert!(Config::from_lookup(lookup(&pairs)).unwrap().spaces.is_some());
    }

    #[test]
    fn missing_database_settings_fail() {
        let pairs: Vec<_> = BASE.iter().copied().filter(|(k, _)| *k != "DB_HOST").collect();
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err.to_string().contains("DB_HOST"));
    }

    #[test]
    fn some_token_check_is_required() {
        let pairs: Vec<_> = BASE
            .iter()
            .copied()
            .filter(|(k, _)| *k != "AUTH_INTROSPECTION_URL")
            .collect();
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn invalid_numbers_are_reported() {
        let mut pairs = BASE.to_vec();
        pairs.push(("PORT", "eighty"));
        assert!(Config::from_lookup(lookup(&pairs)).unwrap_err().to_string().contains("PORT"));
    }

    #[test]
    fn origins_parse_from_csv() {
        assert_eq!(
            parse_origins("https://a.example, https://b.example/ ,"),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(parse_origins("*").is_empty());
    }
}
