//! Infrastructure - cold path
//!
//! Non-core plumbing:
//! - Configuration management
//! - Logging and metrics
//! - HTTP/WebSocket server

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;

pub use api::{start_server, AppState};
pub use metrics::{MetricsCollector, MetricsSnapshot};
