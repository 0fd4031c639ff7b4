// SA ID Validator - Web Server
// REST API with Axum over the identity-number validator

use anyhow::{Context, Result};
use sa_id_validator::api::{router, AppState};
use sa_id_validator::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    println!("🌐 SA ID Validator - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match config.reference_year {
        Some(year) => info!(reference_year = year, "reference year pinned"),
        None => info!("reference year follows the clock"),
    }

    let app = router(AppState {
        reference_year: config.reference_year,
    });

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server_addr))?;

    println!("\n🚀 Server running on http://{}", config.server_addr);
    println!("   API: http://{}/api/validate/<id_number>", config.server_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
