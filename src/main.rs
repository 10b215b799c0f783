//! Market-data relay entry point
//!
//! Wires the pieces together: loads config, starts the API/WebSocket
//! server, then runs the polling scheduler until ctrl-c.

use market_relay::core::MarketHours;
use market_relay::infrastructure::logging::init_logging;
use market_relay::infrastructure::{start_server, AppState, MetricsCollector};
use market_relay::relay::{Broadcaster, PollScheduler, SubscriberRegistry};
use market_relay::upstream::{ContestClient, QuoteClient};
use market_relay::{Config, RelayError, Result};
use std::sync::Arc;
use tokio::sync::watch;

/// Main application state
pub struct RelayApp {
    config: Config,
}

impl RelayApp {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the relay: API server task plus the polling loop
    pub async fn run(&self) -> Result<()> {
        tracing::info!("Starting market-relay...");

        let market = MarketHours::from_config(&self.config.market)
            .map_err(|e| RelayError::Config(e.to_string()))?;

        let registry = Arc::new(SubscriberRegistry::new());
        let metrics = Arc::new(MetricsCollector::new());

        let fetch_timeout = self.config.relay.fetch_timeout();
        let quote_client = QuoteClient::new(&self.config.upstream.quote_url, fetch_timeout);
        let contest_client = ContestClient::new(&self.config.upstream.contest_url, fetch_timeout);

        // API server: validate/quote/status plus subscriber connections
        let state = AppState {
            source: quote_client.clone(),
            registry: registry.clone(),
            metrics: metrics.clone(),
            subscriber_buffer: self.config.relay.subscriber_buffer,
        };
        let port = self.config.api.port;
        tokio::spawn(async move {
            if let Err(e) = start_server(state, port).await {
                tracing::error!("API server failed: {}", e);
            }
        });

        // ctrl-c flips the watch channel the scheduler's sleep selects on
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
        });

        let broadcaster = Broadcaster::new(registry.clone(), metrics.clone());
        let scheduler = PollScheduler::new(
            contest_client,
            quote_client,
            broadcaster,
            market,
            metrics,
            self.config.relay.clone(),
        );

        // Runs until shutdown (this blocks the task)
        scheduler.run(shutdown_rx).await;

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guards = init_logging();

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Falling back to default configuration: {}", e);
        Config::default()
    });

    RelayApp::new(config).run().await
}
