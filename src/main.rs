// src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use car_service::{config::AppState, create_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new().await?;

    if app_state.config.run_migrations {
        sqlx::migrate!().run(&app_state.db_pool).await?;
        tracing::info!("database migrations applied");
    }

    let addr = format!("0.0.0.0:{}", app_state.config.port);
    let environment = app_state.config.environment.clone();
    let app = create_app(app_state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %listener.local_addr()?, environment = %environment, "car-service listening");

    axum::serve(listener, app).await?;
    Ok(())
}
