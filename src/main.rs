use std::net::SocketAddr;
use std::sync::Arc;

use moshi_pay::api::{self, AppState};
use moshi_pay::config::Config;
use moshi_pay::payments::providers::MpesaProvider;
use moshi_pay::sms::SmsRelay;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Log startup info
    tracing::info!("Starting moshi-pay");
    tracing::info!("Environment: {}", config.server.environment);
    tracing::info!("Gateway: {}", config.mpesa.base_url);
    tracing::info!("SMS sender: {}", config.sms.sender);

    // Build shared clients
    let state = AppState {
        provider: Arc::new(MpesaProvider::new(config.mpesa.clone())),
        relay: Arc::new(SmsRelay::new(config.sms.clone())),
        config: config.clone(),
    };

    // Build router
    let app = api::router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
