//! Advisorly service binary: configuration, wiring, and the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use advisorly::adapters::http::{api_routes, AppState};
use advisorly::adapters::{
    LoggingNotificationEmitter, PostgresPaymentRepository, PostgresReservationReader,
    PostgresReservationStore, SystemClock, TossConfig, TossGateway,
};
use advisorly::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let gateway_config = TossConfig::new(config.gateway.secret_key.clone())
        .with_base_url(config.gateway.api_base_url.clone())
        .with_timeout(config.gateway.timeout());

    let state = AppState {
        store: Arc::new(PostgresReservationStore::new(pool.clone())),
        payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
        gateway: Arc::new(TossGateway::new(gateway_config)),
        reader: Arc::new(PostgresReservationReader::new(pool)),
        notifications: Arc::new(LoggingNotificationEmitter::new()),
        clock: Arc::new(SystemClock),
    };

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, "starting advisorly");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, api_routes(state)).await?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
