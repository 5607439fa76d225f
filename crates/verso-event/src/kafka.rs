//! Kafka event sink.
//!
//! All file events go to a single topic, keyed by file id so that events
//! for one file stay ordered within a partition. The payload is the JSON
//! encoding of [`DomainEvent`]; the event type travels in the payload's
//! `type` tag.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use tracing::{debug, warn};

use verso_core::config::events::KafkaConfig;
use verso_core::error::{AppError, ErrorKind};
use verso_core::events::DomainEvent;
use verso_core::result::AppResult;
use verso_core::traits::EventSink;

/// Kafka-backed event sink. Selected via `events.sink = "kafka"`.
pub struct KafkaEventSink {
    producer: FutureProducer,
    topic: String,
    send_timeout: Duration,
}

impl std::fmt::Debug for KafkaEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaEventSink")
            .field("topic", &self.topic)
            .finish()
    }
}

impl KafkaEventSink {
    /// Create a new Kafka event sink from configuration.
    pub fn new(config: &KafkaConfig) -> AppResult<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Event, "Failed to create Kafka producer", e)
            })?;

        Ok(Self {
            producer,
            topic: config.topic.clone(),
            send_timeout: Duration::from_secs(config.send_timeout_seconds),
        })
    }
}

#[async_trait]
impl EventSink for KafkaEventSink {
    fn sink_type(&self) -> &str {
        "kafka"
    }

    async fn publish(&self, event: DomainEvent) {
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(event_id = %event.id, error = %e, "Failed to serialize domain event");
                return;
            }
        };

        let key = event.partition_key();
        let record = FutureRecord::to(&self.topic).payload(&payload).key(&key);

        match self.producer.send(record, self.send_timeout).await {
            Ok((partition, offset)) => {
                debug!(
                    topic = %self.topic,
                    event_id = %event.id,
                    partition,
                    offset,
                    "Published domain event"
                );
            }
            Err((e, _)) => {
                warn!(
                    topic = %self.topic,
                    event_id = %event.id,
                    error = %e,
                    "Failed to publish domain event"
                );
            }
        }
    }
}
