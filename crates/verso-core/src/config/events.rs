//! Event sink configuration.

use serde::{Deserialize, Serialize};

/// Event sink configuration.
///
/// Exactly one sink is activated at startup, selected by `sink`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Active sink: `"log"` or `"kafka"`.
    #[serde(default = "default_sink")]
    pub sink: String,
    /// Kafka sink configuration.
    #[serde(default)]
    pub kafka: KafkaConfig,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            sink: default_sink(),
            kafka: KafkaConfig::default(),
        }
    }
}

/// Kafka producer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Comma-separated broker list.
    #[serde(default = "default_brokers")]
    pub brokers: String,
    /// Topic all file events are published to.
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Producer send timeout in seconds.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_seconds: u64,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: default_brokers(),
            topic: default_topic(),
            send_timeout_seconds: default_send_timeout(),
        }
    }
}

fn default_sink() -> String {
    "log".to_string()
}

fn default_brokers() -> String {
    "localhost:9092".to_string()
}

fn default_topic() -> String {
    "files.events.v1".to_string()
}

fn default_send_timeout() -> u64 {
    5
}
