//! Price quotes and per-cycle batches
//!
//! A `PriceQuote` is one successfully fetched price, stamped with the
//! fetch time. A `PriceBatch` is everything one poll cycle produced; it is
//! serialized once into the wire frame pushed to every subscriber.

use crate::core::Symbol;
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

/// One fetched price for one symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub symbol: Symbol,
    pub price: Decimal,
    /// Fetch time, not source time
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl PriceQuote {
    /// Build a quote. Returns `None` for a negative price, which only an
    /// upstream glitch would produce.
    pub fn new(symbol: Symbol, price: Decimal, timestamp: OffsetDateTime) -> Option<Self> {
        if price.is_sign_negative() && !price.is_zero() {
            return None;
        }
        Some(Self {
            symbol,
            price,
            timestamp,
        })
    }
}

/// The quotes produced by one poll cycle, sorted by symbol with at most
/// one entry per symbol
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PriceBatch(Vec<PriceQuote>);

impl PriceBatch {
    /// Build a batch from a cycle's fetch results.
    ///
    /// Quotes are sorted by symbol for deterministic frames (concurrent
    /// fetches complete in arbitrary order) and deduplicated per symbol.
    pub fn new(mut quotes: Vec<PriceQuote>) -> Self {
        quotes.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        quotes.dedup_by(|a, b| a.symbol == b.symbol);
        Self(quotes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn quotes(&self) -> &[PriceQuote] {
        &self.0
    }

    /// Serialize the batch into the subscriber wire frame:
    /// `{"type":"price_update","data":[...]}`
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(&PriceUpdateFrame {
            kind: "price_update",
            data: &self.0,
        })
    }
}

#[derive(Serialize)]
struct PriceUpdateFrame<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: &'a [PriceQuote],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(symbol: &str, price: i64) -> PriceQuote {
        PriceQuote::new(
            Symbol::new(symbol).unwrap(),
            Decimal::new(price, 1),
            OffsetDateTime::UNIX_EPOCH,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_negative_price() {
        let quote = PriceQuote::new(
            Symbol::new("AAPL").unwrap(),
            Decimal::new(-1, 0),
            OffsetDateTime::UNIX_EPOCH,
        );
        assert!(quote.is_none());
    }

    #[test]
    fn test_accepts_zero_price() {
        let quote = PriceQuote::new(
            Symbol::new("AAPL").unwrap(),
            Decimal::ZERO,
            OffsetDateTime::UNIX_EPOCH,
        );
        assert!(quote.is_some());
    }

    #[test]
    fn test_batch_sorted_by_symbol() {
        let batch = PriceBatch::new(vec![quote("MSFT", 4100), quote("AAPL", 1905)]);
        let symbols: Vec<&str> = batch.quotes().iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_batch_dedups_per_symbol() {
        let batch = PriceBatch::new(vec![quote("AAPL", 1905), quote("AAPL", 1906)]);
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let batch = PriceBatch::new(Vec::new());
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }

    #[test]
    fn test_frame_shape() {
        let batch = PriceBatch::new(vec![quote("AAPL", 1905)]);
        let frame = batch.to_frame().unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "price_update");
        assert_eq!(value["data"][0]["symbol"], "AAPL");
        assert_eq!(value["data"][0]["price"], 190.5);
        assert!(value["data"][0]["timestamp"].is_string());
    }

    #[test]
    fn test_price_serializes_as_number() {
        let frame = PriceBatch::new(vec![quote("AAPL", 1905)]).to_frame().unwrap();
        assert!(frame.contains("\"price\":190.5"));
    }
}
