//! Ticker symbol type
//!
//! Symbols are uppercase ASCII tickers validated at the edge, so the rest
//! of the relay never sees a malformed one. Exchange-suffixed listings
//! like `RELIANCE.NS` and share classes like `BRK-B` are accepted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum accepted ticker length, including any exchange suffix
pub const MAX_SYMBOL_LEN: usize = 16;

/// A validated, uppercase ticker symbol
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a raw ticker string.
    ///
    /// Input is trimmed and uppercased. Letters, digits, `.` and `-` are
    /// allowed; anything else is rejected.
    pub fn new(raw: &str) -> Result<Self, SymbolError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SymbolError::Empty);
        }
        if trimmed.len() > MAX_SYMBOL_LEN {
            return Err(SymbolError::TooLong(trimmed.len()));
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
        {
            return Err(SymbolError::InvalidChar(c));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// Symbol validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("symbol is empty")]
    Empty,

    #[error("symbol is too long ({0} chars, max {MAX_SYMBOL_LEN})")]
    TooLong(usize),

    #[error("symbol contains invalid character {0:?}")]
    InvalidChar(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_to_uppercase() {
        let symbol = Symbol::new("aapl").unwrap();
        assert_eq!(symbol.as_str(), "AAPL");
    }

    #[test]
    fn test_trims_whitespace() {
        let symbol = Symbol::new("  MSFT\n").unwrap();
        assert_eq!(symbol.as_str(), "MSFT");
    }

    #[test]
    fn test_accepts_suffixed_and_classed_tickers() {
        assert!(Symbol::new("RELIANCE.NS").is_ok());
        assert!(Symbol::new("BRK-B").is_ok());
        assert!(Symbol::new("BRK.B").is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Symbol::new(""), Err(SymbolError::Empty));
        assert_eq!(Symbol::new("   "), Err(SymbolError::Empty));
    }

    #[test]
    fn test_rejects_invalid_chars() {
        assert_eq!(Symbol::new("AA PL"), Err(SymbolError::InvalidChar(' ')));
        assert_eq!(Symbol::new("AAPL!"), Err(SymbolError::InvalidChar('!')));
        assert_eq!(Symbol::new("A/B"), Err(SymbolError::InvalidChar('/')));
    }

    #[test]
    fn test_rejects_too_long() {
        let long = "A".repeat(MAX_SYMBOL_LEN + 1);
        assert!(matches!(Symbol::new(&long), Err(SymbolError::TooLong(_))));
    }

    #[test]
    fn test_equality_after_normalization() {
        assert_eq!(Symbol::new("aapl").unwrap(), Symbol::new("AAPL").unwrap());
    }

    #[test]
    fn test_serde_round_trip() {
        let symbol = Symbol::new("GOOG").unwrap();
        let json = serde_json::to_string(&symbol).unwrap();
        assert_eq!(json, "\"GOOG\"");
        let back: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(back, symbol);
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        assert!(serde_json::from_str::<Symbol>("\"\"").is_err());
        assert!(serde_json::from_str::<Symbol>("\"BAD SYMBOL\"").is_err());
    }
}
