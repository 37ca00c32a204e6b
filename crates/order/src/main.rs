use anyhow::{Context, Result};
use order::{config::Config, handler::AppRouter, state::AppState};
use shared::{
    config::{ConnectionManager, ConnectionPool},
    utils::{Telemetry, init_logger},
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;

    let telemetry = setup_telemetry(&config);

    let db_pool = ConnectionManager::new_pool(
        &config.database_url,
        config.db_min_conn,
        config.db_max_conn,
    )
    .await
    .context("Failed to initialize database pool")?;

    if config.run_migrations {
        run_migrations(&db_pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let state = AppState::new(db_pool, &config)
        .await
        .context("Failed to create AppState")?;

    info!(
        "✅ Application setup completed (cache write policy: {}, request timeout: {:?})",
        config.cache_write_policy, config.request_timeout
    );

    AppRouter::serve(config.port, state)
        .await
        .context("Failed to start server")?;

    info!("🛑 Shutting down order service...");

    if let Some(telemetry) = telemetry
        && let Err(e) = telemetry.shutdown()
    {
        error!("Failed to shutdown telemetry: {e}");
    }

    info!("✅ Order service shutdown complete.");

    Ok(())
}

/// Installs logging, and OTLP export when an endpoint is configured.
fn setup_telemetry(config: &Config) -> Option<Telemetry> {
    let Some(endpoint) = config.otel_endpoint.clone() else {
        init_logger(None, "order-service", config.is_dev, config.enable_file_log);
        return None;
    };

    let mut telemetry = Telemetry::new("order-service", endpoint);
    let logger_provider = telemetry.init_logger().ok();
    let tracer_ready = telemetry.init_tracer().is_ok();

    init_logger(
        logger_provider,
        "order-service",
        config.is_dev,
        config.enable_file_log,
    );

    if !tracer_ready {
        error!("Failed to initialize OTLP tracer, spans will not be exported");
    }

    Some(telemetry)
}

async fn run_migrations(pool: &ConnectionPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;

    info!("✅ Database migrations applied");
    Ok(())
}
