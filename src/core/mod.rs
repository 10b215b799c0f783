//! Core domain types
//!
//! This module contains the fundamental types used throughout the relay:
//! - Symbol: Validated uppercase ticker
//! - PriceQuote / PriceBatch: One poll cycle's output
//! - MarketHours: Trading-hours clock driving the polling cadence

pub mod market_hours;
pub mod quote;
pub mod symbol;

pub use market_hours::MarketHours;
pub use quote::{PriceBatch, PriceQuote};
pub use symbol::{Symbol, SymbolError};
