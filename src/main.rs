mod availability;
mod config;
mod notifier;
mod server;
mod watcher;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::availability::{CalendarClient, CheckWindow};
use crate::config::AppConfig;
use crate::notifier::SmsNotifier;
use crate::watcher::Watcher;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "park_alert=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    tracing::info!("Starting park reservation alert service");

    let window = CheckWindow {
        park: config.park_code,
        start: config.start_date,
        end: config.end_date,
    };
    let checker = CalendarClient::new();
    let notifier = SmsNotifier::new(
        config.twilio_account_sid.clone(),
        config.twilio_auth_token.clone(),
    );
    let mut watcher = Watcher::new(
        checker,
        notifier,
        window,
        config.subscribed_phone_number.clone(),
        Duration::from_secs(config.poll_interval_secs),
    );

    tokio::spawn(async move {
        watcher.run().await;
    });

    // The listener only keeps the process alive for the hosting environment;
    // it stays up after the watcher finishes.
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, server::keep_alive_routes()).await?;

    Ok(())
}
