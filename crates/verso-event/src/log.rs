//! Log-only event sink for development and tests.

use async_trait::async_trait;
use tracing::{info, warn};

use verso_core::events::DomainEvent;
use verso_core::traits::EventSink;

/// Event sink that writes events to the application log instead of a
/// broker. Selected via `events.sink = "log"`.
#[derive(Debug, Default, Clone)]
pub struct LogEventSink;

#[async_trait]
impl EventSink for LogEventSink {
    fn sink_type(&self) -> &str {
        "log"
    }

    async fn publish(&self, event: DomainEvent) {
        match serde_json::to_string(&event.payload) {
            Ok(payload) => info!(
                event_id = %event.id,
                occurred_at = %event.occurred_at,
                %payload,
                "Domain event"
            ),
            Err(e) => warn!(event_id = %event.id, error = %e, "Failed to serialize domain event"),
        }
    }
}
