use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use rizos_bot::config::BotConfig;
use rizos_bot::content::ContentStore;
use rizos_bot::logging;
use rizos_bot::pipeline::Responder;
use rizos_bot::webhook::{AppState, webhook_routes};
use rizos_bot::whatsapp::WhatsAppClient;
use rizos_bot::whatsapp::client::send_test_template;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real deployments set the environment directly
    let _ = dotenvy::dotenv();

    let config = BotConfig::from_env().context("Failed to load configuration")?;
    let _log_guards = logging::init(&config.log_dir)?;

    eprintln!("💇 Rizos Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Phone number ID: {}", config.whatsapp.phone_number_id);
    eprintln!("   Graph API: {}", config.whatsapp.api_version);
    eprintln!("   Messages: {}", config.messages_dir.display());
    eprintln!("   Logs: {}", config.log_dir.display());

    if std::env::args().nth(1).as_deref() == Some("send-test") {
        return send_test(&config).await;
    }

    let missing = ContentStore::new(&config.messages_dir)
        .missing(&Responder::required_files())
        .await;
    if !missing.is_empty() {
        warn!(files = ?missing, "Some message files are missing; those replies will show an error");
    }

    let state = AppState::from_config(&config)?;
    let app = webhook_routes(state);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    eprintln!("   Webhook: http://{addr}/webhook\n");
    info!(%addr, "Webhook server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Webhook server stopped");
    Ok(())
}

async fn send_test(config: &BotConfig) -> anyhow::Result<()> {
    let recipient = config
        .whatsapp
        .recipient_waid
        .clone()
        .context("RECIPIENT_WAID must be set for send-test")?;

    let client = WhatsAppClient::new(config.whatsapp.clone())?;
    let receipt = send_test_template(&client, &recipient).await?;
    eprintln!("   Test template sent to {recipient} (HTTP {})", receipt.status);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
