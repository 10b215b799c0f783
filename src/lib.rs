//! Market-data relay
//!
//! # Architecture
//! - **core**: Domain types (Symbol, PriceQuote, PriceBatch, MarketHours)
//! - **upstream**: Collaborator shims (contest service, quote source)
//! - **relay**: Polling scheduler, subscriber registry, broadcaster
//! - **infrastructure**: Cold path (logging, metrics, config, api)

pub mod core;
pub mod infrastructure;
pub mod relay;
pub mod upstream;

// Re-export commonly used types
pub use infrastructure::config::{ApiConfig, Config, MarketConfig, RelayConfig, UpstreamConfig};

use thiserror::Error;

/// Main error type for the relay
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Broadcast error: {0}")]
    Broadcast(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RelayError>;
