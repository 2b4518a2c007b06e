// HVAC Sizing - Web Server
// REST API with Axum

use anyhow::{Context, Result};
use hvac_sizing::{create_router, insert_equipment, setup_database, verify_count, AppState, Config};
use rusqlite::Connection;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hvac_sizing=info,tower_http=debug,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Configuration:");
    tracing::info!("  HVAC_DB_PATH: {:?}", config.db_path);
    tracing::info!("  Match policy: {:?}", config.policy);
    tracing::info!("  Floor area bounds: {:?}", config.area_bounds);

    let conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open database {:?}", config.db_path))?;
    setup_database(&conn)?;

    let count = verify_count(&conn)?;
    if count == 0 {
        tracing::warn!("Equipment catalog is empty; loading the default catalog");
        insert_equipment(&conn, &hvac_sizing::default_catalog())?;
    } else {
        tracing::info!("Catalog contains {} records", count);
    }

    let app = create_router(AppState::from_config(conn, &config));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("  POST /api/calculate");
    tracing::info!("  GET  /api/systems/:lead_id");

    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
