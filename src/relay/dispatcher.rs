//! Broadcast dispatcher
//!
//! Delivers one batch to every registered subscriber. The frame is
//! serialized once and shared; sends are non-blocking so one slow or dead
//! connection cannot stall the cycle or the other subscribers. Failed
//! sends prune the subscriber on the spot.

use crate::core::PriceBatch;
use crate::infrastructure::metrics::MetricsCollector;
use crate::relay::SubscriberRegistry;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;

/// Fans one batch out to the registry's current subscribers
pub struct Broadcaster {
    registry: Arc<SubscriberRegistry>,
    metrics: Arc<MetricsCollector>,
}

impl Broadcaster {
    pub fn new(registry: Arc<SubscriberRegistry>, metrics: Arc<MetricsCollector>) -> Self {
        Self { registry, metrics }
    }

    /// Deliver a batch to every currently registered subscriber.
    ///
    /// Best-effort, at-most-once. Subscribers whose channel is closed or
    /// full are unregistered and delivery continues to the rest. Returns
    /// the number of subscribers the frame was handed to.
    pub fn broadcast(&self, batch: &PriceBatch) -> usize {
        if batch.is_empty() {
            return 0;
        }

        let frame: Arc<str> = match batch.to_frame() {
            Ok(frame) => frame.into(),
            Err(e) => {
                tracing::error!("Failed to serialize price batch: {}", e);
                return 0;
            }
        };

        let subscribers = self.registry.snapshot();
        if subscribers.is_empty() {
            tracing::debug!("No subscribers connected, dropping batch of {}", batch.len());
            return 0;
        }

        let mut delivered = 0;
        for (id, sender) in subscribers {
            match sender.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Closed(_)) => {
                    self.registry.remove(id);
                    tracing::debug!("Subscriber {} disconnected, pruned", id);
                }
                Err(TrySendError::Full(_)) => {
                    // A full buffer means the consumer stopped draining;
                    // drop it rather than queue unbounded frames
                    self.registry.remove(id);
                    tracing::warn!("Subscriber {} too slow, dropped", id);
                }
            }
        }

        self.metrics.record_broadcast(delivered as u64);
        tracing::debug!(
            "Broadcast {} quotes to {} subscribers",
            batch.len(),
            delivered
        );

        delivered
    }
}
