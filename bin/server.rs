// Expense Ledger - Webhook Server
// Twilio WhatsApp webhook + JSON API with Axum

use anyhow::{Context, Result};
use expense_ledger::server::{router, AppState};
use expense_ledger::{Config, Ledger};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🌐 Expense Ledger - Webhook Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = Config::from_env().context("Failed to load configuration")?;
    let ledger = Ledger::from_config(&config).context("Failed to open store")?;

    // Worksheet check happens once here instead of on every request
    ledger
        .ensure_initialized()
        .context("Failed to initialize worksheet")?;
    info!(
        worksheet = %config.worksheet,
        aliases = config.aliases.len(),
        "ledger ready"
    );

    let app = router(AppState::new(ledger));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   Webhook: POST /twilio");
    println!("   API:     GET  /api/summary");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
