//! Contest service client
//!
//! Fetches the active-symbol list from the contest service. The service is
//! treated as unreliable: any failure here degrades to the scheduler's
//! last known symbol set, never to a halt.

use crate::core::Symbol;
use crate::upstream::SymbolProvider;
use std::collections::HashSet;
use std::time::Duration;

/// HTTP client for the contest service's active-symbol endpoint
#[derive(Debug, Clone)]
pub struct ContestClient {
    client: reqwest::Client,
    url: String,
}

impl ContestClient {
    /// Create a client for the given symbol-list URL
    pub fn new(url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .user_agent("market-relay/0.1")
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            url: url.to_string(),
        }
    }
}

impl SymbolProvider for ContestClient {
    /// Fetch the current active-symbol set.
    ///
    /// The response is a JSON array of ticker strings. Entries that fail
    /// symbol validation are skipped with a warning rather than failing
    /// the whole refresh.
    async fn fetch_active_symbols(&self) -> Result<HashSet<Symbol>, ContestError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ContestError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ContestError::Http(response.status().as_u16()));
        }

        let names: Vec<String> = response
            .json()
            .await
            .map_err(|e| ContestError::Parse(e.to_string()))?;

        let symbols: HashSet<Symbol> = names
            .iter()
            .filter_map(|name| match Symbol::new(name) {
                Ok(symbol) => Some(symbol),
                Err(e) => {
                    tracing::warn!("Contest service sent unusable symbol {:?}: {}", name, e);
                    None
                }
            })
            .collect();

        tracing::debug!("Contest service reports {} active symbols", symbols.len());

        Ok(symbols)
    }
}

/// Contest service errors
#[derive(Debug, thiserror::Error)]
pub enum ContestError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}
