//! Quote source client
//!
//! Wraps the external price source: one symbol in, one quote out, or an
//! explicit failure. Unknown symbols and transport problems map to
//! distinct error variants so callers can drop one and retry the other.

use crate::core::{PriceQuote, Symbol};
use crate::upstream::QuoteSource;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use time::OffsetDateTime;

/// HTTP client for the quote source
#[derive(Debug, Clone)]
pub struct QuoteClient {
    client: reqwest::Client,
    base_url: String,
}

impl QuoteClient {
    /// Create a client for the given quote-source base URL
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .user_agent("market-relay/0.1")
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl QuoteSource for QuoteClient {
    /// Fetch the latest price for one symbol.
    ///
    /// The quote is stamped with local fetch time, not source time.
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<PriceQuote, QuoteError> {
        let url = format!("{}/quote/{}", self.base_url, symbol);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| QuoteError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(QuoteError::NotFound(symbol.clone()));
        }
        if !response.status().is_success() {
            return Err(QuoteError::Http(response.status().as_u16()));
        }

        let body: QuoteResponse = response
            .json()
            .await
            .map_err(|e| QuoteError::Parse(e.to_string()))?;

        PriceQuote::new(symbol.clone(), body.price, OffsetDateTime::now_utc())
            .ok_or_else(|| QuoteError::Parse(format!("negative price {} for {}", body.price, symbol)))
    }

    /// Check whether the source knows the symbol.
    ///
    /// A 404 from the validate endpoint means "not a valid symbol", not a
    /// transport failure.
    async fn validate(&self, symbol: &Symbol) -> Result<bool, QuoteError> {
        let url = format!("{}/validate/{}", self.base_url, symbol);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| QuoteError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(QuoteError::Http(response.status().as_u16()));
        }

        let body: ValidationResponse = response
            .json()
            .await
            .map_err(|e| QuoteError::Parse(e.to_string()))?;

        Ok(body.is_valid)
    }
}

// === Source response types ===

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[allow(dead_code)]
    symbol: String,
    price: Decimal,
}

#[derive(Debug, Deserialize)]
struct ValidationResponse {
    #[allow(dead_code)]
    symbol: String,
    #[serde(rename = "isValid")]
    is_valid: bool,
}

/// Quote source errors
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Symbol not found: {0}")]
    NotFound(Symbol),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl QuoteError {
    /// Unknown-symbol errors are caller mistakes; everything else is a
    /// source problem worth retrying later.
    pub fn is_not_found(&self) -> bool {
        matches!(self, QuoteError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = QuoteClient::new("http://localhost:8082/api/", Duration::from_secs(3));
        assert_eq!(client.base_url, "http://localhost:8082/api");
    }

    #[test]
    fn test_quote_response_deserialize() {
        let json = r#"{"symbol":"AAPL","price":190.5}"#;
        let body: QuoteResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.symbol, "AAPL");
        assert_eq!(body.price, Decimal::new(1905, 1));
    }

    #[test]
    fn test_validation_response_deserialize() {
        let json = r#"{"symbol":"AAPL","isValid":true}"#;
        let body: ValidationResponse = serde_json::from_str(json).unwrap();
        assert!(body.is_valid);
    }

    #[test]
    fn test_not_found_classification() {
        let not_found = QuoteError::NotFound(Symbol::new("XXXX").unwrap());
        assert!(not_found.is_not_found());
        assert!(!QuoteError::Http(503).is_not_found());
        assert!(!QuoteError::Network("reset".to_string()).is_not_found());
    }
}
