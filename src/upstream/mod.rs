//! Upstream collaborator shims
//!
//! Thin typed wrappers over the two external HTTP services the relay
//! depends on: the contest service (which symbols are active) and the
//! quote source (what they cost right now). Every call carries a bounded
//! timeout; failures never escalate past the caller.
//!
//! The scheduler depends on the seam traits below rather than the concrete
//! clients, so tests drive it with scripted sources.

pub mod contest;
pub mod quotes;

pub use contest::{ContestClient, ContestError};
pub use quotes::{QuoteClient, QuoteError};

use crate::core::{PriceQuote, Symbol};
use std::collections::HashSet;

/// Source of the current active-symbol set
#[allow(async_fn_in_trait)]
pub trait SymbolProvider: Send + Sync {
    /// Fetch the set of symbols the relay must currently track
    async fn fetch_active_symbols(&self) -> Result<HashSet<Symbol>, ContestError>;
}

/// Source of latest prices, one symbol at a time
#[allow(async_fn_in_trait)]
pub trait QuoteSource: Send + Sync {
    /// Fetch the latest price for one symbol
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<PriceQuote, QuoteError>;

    /// Does the source know this symbol at all?
    async fn validate(&self, symbol: &Symbol) -> Result<bool, QuoteError>;
}
