//! Best-effort notification publishing on the two refund topics.
//!
//! Publishing is fire-and-forget: errors are logged and swallowed so a
//! failed publish can never fail or roll back the operation that
//! triggered it.

use async_trait::async_trait;
use redis::aio::ConnectionManager;

#[async_trait]
pub trait RefundPublisher: Send + Sync {
    /// Publish an outbound refund submission to the send-refund topic.
    async fn publish_send_refund(&self, payload: &str);
    /// Publish a refund status update to the refund-update topic.
    async fn publish_refund_update(&self, payload: &str);
}

/// Redis pub/sub publisher.
#[derive(Clone)]
pub struct RedisPublisher {
    manager: ConnectionManager,
    send_refund_topic: String,
    refund_update_topic: String,
}

impl RedisPublisher {
    pub fn new(
        manager: ConnectionManager,
        send_refund_topic: String,
        refund_update_topic: String,
    ) -> Self {
        Self {
            manager,
            send_refund_topic,
            refund_update_topic,
        }
    }

    async fn publish(&self, topic: &str, payload: &str) {
        let mut conn = self.manager.clone();
        let result: Result<(), _> = redis::cmd("PUBLISH")
            .arg(topic)
            .arg(payload)
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => tracing::info!(topic = topic, "Published message"),
            Err(e) => tracing::error!(topic = topic, "Failed to publish message: {}", e),
        }
    }
}

#[async_trait]
impl RefundPublisher for RedisPublisher {
    async fn publish_send_refund(&self, payload: &str) {
        self.publish(&self.send_refund_topic, payload).await;
    }

    async fn publish_refund_update(&self, payload: &str) {
        self.publish(&self.refund_update_topic, payload).await;
    }
}

/// No-op publisher used when pub/sub is disabled.
pub struct NoOpPublisher;

#[async_trait]
impl RefundPublisher for NoOpPublisher {
    async fn publish_send_refund(&self, payload: &str) {
        tracing::info!("Pub/Sub disabled - skipping send refund message: {}", payload);
    }

    async fn publish_refund_update(&self, payload: &str) {
        tracing::info!(
            "Pub/Sub disabled - skipping refund update message: {}",
            payload
        );
    }
}

/// Recording publisher for tests.
pub struct MemoryPublisher {
    pub messages: std::sync::Mutex<Vec<(String, String)>>,
}

impl Default for MemoryPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self {
            messages: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn record(&self, topic: &str, payload: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((topic.to_string(), payload.to_string()));
        }
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RefundPublisher for MemoryPublisher {
    async fn publish_send_refund(&self, payload: &str) {
        self.record("send-refund", payload);
    }

    async fn publish_refund_update(&self, payload: &str) {
        self.record("refund-update", payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_publisher_records_both_topics_in_order() {
        let publisher = MemoryPublisher::new();
        publisher.publish_send_refund("{\"status\":\"pending\"}").await;
        publisher.publish_refund_update("{\"status\":\"approved\"}").await;

        let published = publisher.published();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].0, "send-refund");
        assert_eq!(published[1].0, "refund-update");
        assert!(published[1].1.contains("approved"));
    }
}
