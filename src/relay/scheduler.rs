//! Poll scheduler
//!
//! The long-lived control loop: refresh the active-symbol set when due,
//! fetch a quote per symbol with bounded concurrency, hand the batch to
//! the broadcaster, then sleep for an interval chosen by the market
//! clock. Every failure inside a cycle is logged and survived; only the
//! shutdown signal ends the loop.

use crate::core::{MarketHours, PriceBatch, PriceQuote, Symbol};
use crate::infrastructure::config::RelayConfig;
use crate::infrastructure::metrics::MetricsCollector;
use crate::relay::Broadcaster;
use crate::upstream::{QuoteSource, SymbolProvider};
use futures_util::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use tokio::sync::watch;

/// Scheduler-private cadence state
struct PollingState {
    current_interval: Duration,
    last_symbol_refresh: Option<Instant>,
}

/// Drives the refresh/fetch/broadcast cycle until shut down
pub struct PollScheduler<S, Q> {
    provider: S,
    source: Q,
    broadcaster: Broadcaster,
    market: MarketHours,
    metrics: Arc<MetricsCollector>,
    config: RelayConfig,
    /// Replaced wholesale on each successful refresh, never mutated in place
    symbols: HashSet<Symbol>,
    state: PollingState,
}

impl<S, Q> PollScheduler<S, Q>
where
    S: SymbolProvider,
    Q: QuoteSource,
{
    pub fn new(
        provider: S,
        source: Q,
        broadcaster: Broadcaster,
        market: MarketHours,
        metrics: Arc<MetricsCollector>,
        config: RelayConfig,
    ) -> Self {
        let state = PollingState {
            current_interval: config.closed_interval(),
            last_symbol_refresh: None,
        };
        Self {
            provider,
            source,
            broadcaster,
            market,
            metrics,
            config,
            symbols: HashSet::new(),
            state,
        }
    }

    /// Run cycles until the shutdown signal flips.
    ///
    /// The inter-cycle sleep is cancellable; an in-flight fetch round
    /// finishes first (bounded by the per-symbol timeout) and the loop
    /// exits before the next one starts.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            "Poll scheduler started (open {}s / closed {}s)",
            self.config.open_interval_secs,
            self.config.closed_interval_secs
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.tick().await;

            let interval = self.next_interval(OffsetDateTime::now_utc());
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Poll scheduler stopped");
    }

    /// One cycle: refresh symbols if due, fetch, broadcast
    async fn tick(&mut self) {
        self.refresh_symbols_if_due().await;

        if self.symbols.is_empty() {
            tracing::debug!("No active symbols, skipping cycle");
            return;
        }

        // Snapshot taken at cycle start; every broadcast quote traces
        // back to a symbol in this snapshot
        let snapshot: Vec<Symbol> = self.symbols.iter().cloned().collect();
        let batch = self.fetch_batch(&snapshot).await;
        self.metrics.record_cycle();

        if batch.is_empty() {
            tracing::debug!("All {} fetches failed, nothing to broadcast", snapshot.len());
            return;
        }

        self.broadcaster.broadcast(&batch);
    }

    /// Re-resolve the active-symbol set once its refresh window lapses.
    ///
    /// A resolver failure or an empty result keeps the last known set.
    /// Failures retry on the next tick instead of waiting out the whole
    /// window, so a fresh process does not sit symbol-less for long.
    async fn refresh_symbols_if_due(&mut self) {
        let due = match self.state.last_symbol_refresh {
            None => true,
            Some(at) => at.elapsed() >= self.config.symbol_refresh_interval(),
        };
        if !due {
            return;
        }

        match self.provider.fetch_active_symbols().await {
            Ok(symbols) if !symbols.is_empty() => {
                if symbols != self.symbols {
                    tracing::info!("Active symbol set refreshed: {} symbols", symbols.len());
                }
                self.symbols = symbols;
                self.state.last_symbol_refresh = Some(Instant::now());
            }
            Ok(_) => {
                tracing::warn!(
                    "Contest service returned no symbols, keeping previous {} symbols",
                    self.symbols.len()
                );
                self.state.last_symbol_refresh = Some(Instant::now());
            }
            Err(e) => {
                tracing::warn!(
                    "Symbol refresh failed ({}), keeping previous {} symbols",
                    e,
                    self.symbols.len()
                );
            }
        }
    }

    /// Fetch one quote per symbol with bounded concurrency.
    ///
    /// Each fetch carries its own timeout; failures and timeouts are
    /// dropped from the batch, never retried within the cycle.
    async fn fetch_batch(&self, symbols: &[Symbol]) -> PriceBatch {
        let timeout = self.config.fetch_timeout();

        let quotes: Vec<PriceQuote> = futures_util::stream::iter(symbols.iter().cloned())
            .map(|symbol| async move {
                match tokio::time::timeout(timeout, self.source.fetch_quote(&symbol)).await {
                    Ok(Ok(quote)) => Some(quote),
                    Ok(Err(e)) => {
                        self.metrics.record_fetch_failure();
                        tracing::debug!("Quote fetch for {} failed: {}", symbol, e);
                        None
                    }
                    Err(_) => {
                        self.metrics.record_fetch_failure();
                        tracing::debug!("Quote fetch for {} timed out", symbol);
                        None
                    }
                }
            })
            .buffer_unordered(self.config.max_concurrent_fetches.max(1))
            .filter_map(|quote| async move { quote })
            .collect()
            .await;

        self.metrics.record_quotes(quotes.len() as u64);
        PriceBatch::new(quotes)
    }

    /// Interval for the upcoming sleep, re-evaluated every tick so a
    /// market open/close takes effect on the very next cycle
    fn next_interval(&mut self, now: OffsetDateTime) -> Duration {
        let open = self.market.is_open_at(now);
        let interval = if open {
            self.config.open_interval()
        } else {
            self.config.closed_interval()
        };

        if interval != self.state.current_interval {
            tracing::info!(
                "Market {} -> polling every {}s",
                if open { "open" } else { "closed" },
                interval.as_secs()
            );
            self.state.current_interval = interval;
        }

        interval
    }
}
