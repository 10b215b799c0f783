//! Metrics collection for relay monitoring
//!
//! Atomic counters updated from the scheduler and dispatcher.
//! Snapshots taken for API export.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime};

/// Relay metrics collector
///
/// Thread-safe counters updated from the polling loop and the WebSocket
/// handlers. Snapshots taken for API export.
pub struct MetricsCollector {
    /// Completed poll cycles
    cycles: AtomicU64,
    /// Quotes successfully fetched across all cycles
    quotes_fetched: AtomicU64,
    /// Quote fetches that failed or timed out
    fetch_failures: AtomicU64,
    /// Batches broadcast (non-empty only)
    broadcasts: AtomicU64,
    /// Per-subscriber frame deliveries
    frames_delivered: AtomicU64,
    /// Currently connected subscribers
    subscribers: AtomicU64,
    /// Last broadcast timestamp (Unix millis)
    last_broadcast_time: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

/// Metrics snapshot for API export
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub quotes_fetched: u64,
    pub fetch_failures: u64,
    pub broadcasts: u64,
    pub frames_delivered: u64,
    pub subscribers: u64,
    pub uptime_seconds: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            cycles: AtomicU64::new(0),
            quotes_fetched: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            broadcasts: AtomicU64::new(0),
            frames_delivered: AtomicU64::new(0),
            subscribers: AtomicU64::new(0),
            last_broadcast_time: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one completed poll cycle
    #[inline]
    pub fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// Record successfully fetched quotes for one cycle
    #[inline]
    pub fn record_quotes(&self, count: u64) {
        self.quotes_fetched.fetch_add(count, Ordering::Relaxed);
    }

    /// Record one failed or timed-out quote fetch
    #[inline]
    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one broadcast and how many subscribers it reached
    pub fn record_broadcast(&self, delivered: u64) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.frames_delivered.fetch_add(delivered, Ordering::Relaxed);

        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        self.last_broadcast_time.store(now, Ordering::Relaxed);
    }

    /// A subscriber connected
    pub fn subscriber_connected(&self) {
        self.subscribers.fetch_add(1, Ordering::Relaxed);
    }

    /// A subscriber disconnected (gauge never underflows)
    pub fn subscriber_disconnected(&self) {
        let _ = self
            .subscribers
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    }

    /// Get current snapshot of metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            quotes_fetched: self.quotes_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            subscribers: self.subscribers.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Milliseconds since the last broadcast, capped at 10000.
    /// Returns the cap when nothing has been broadcast yet.
    pub fn broadcast_staleness_ms(&self) -> u64 {
        let last = self.last_broadcast_time.load(Ordering::Relaxed);
        if last == 0 {
            return 10000;
        }

        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        now.saturating_sub(last).min(10000)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
