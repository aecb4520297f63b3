//! Event bus for gatecast using tokio::broadcast
//!
//! Publishes forecast refreshes to any number of consumers.

use chrono::{DateTime, Utc};
use gatecast_types::Next8hResponse;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::analytics::ForecastSummary;
use crate::quality::ClampReason;
use crate::window::{DashboardQuery, TimeWindow};

/// One successful refresh of a dashboard query
#[derive(Debug, Clone)]
pub struct ForecastSnapshot {
    pub query: DashboardQuery,
    pub window: TimeWindow,
    pub response: Next8hResponse,
    pub summary: ForecastSummary,
    pub fetched_at: DateTime<Utc>,
}

/// Events emitted by the live poller
#[derive(Debug, Clone)]
pub enum ForecastEvent {
    /// Fresh data for the polled query
    Updated(Arc<ForecastSnapshot>),
    /// A refresh failed; the previous snapshot stays current
    FetchFailed(String),
    /// Clamps recorded since the previous refresh
    DataQuality(Vec<(ClampReason, u64)>),
    /// Poller finished (custom window fetched, or shut down)
    Stopped,
}

/// Event bus for broadcasting forecast events
///
/// Uses tokio::broadcast for multi-consumer support.
pub struct EventBus {
    sender: broadcast::Sender<ForecastEvent>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create with default capacity (64 events)
    pub fn default_capacity() -> Self {
        Self::new(64)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: ForecastEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ForecastEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let bus = EventBus::default_capacity();
        let mut rx = bus.subscribe();

        bus.publish(ForecastEvent::FetchFailed("timeout".to_string()));
        bus.publish(ForecastEvent::DataQuality(vec![(ClampReason::NegativePred, 2)]));

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, ForecastEvent::FetchFailed(msg) if msg == "timeout"));

        let second = rx.recv().await.unwrap();
        assert!(matches!(second, ForecastEvent::DataQuality(counts) if counts.len() == 1));
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::default_capacity();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.clone().subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(ForecastEvent::Stopped);

        assert!(matches!(rx1.recv().await.unwrap(), ForecastEvent::Stopped));
        assert!(matches!(rx2.recv().await.unwrap(), ForecastEvent::Stopped));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default_capacity();
        bus.publish(ForecastEvent::Stopped);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
