//! # verso-event
//!
//! Event sink implementations for Verso. Events are published best-effort;
//! delivery failures are logged and never surfaced to callers. Exactly one
//! sink is activated per process, selected from configuration at startup.

#[cfg(feature = "kafka")]
pub mod kafka;
pub mod log;

use std::sync::Arc;

use verso_core::config::events::EventsConfig;
use verso_core::error::AppError;
use verso_core::result::AppResult;
use verso_core::traits::EventSink;

#[cfg(feature = "kafka")]
pub use kafka::KafkaEventSink;
pub use log::LogEventSink;

/// Construct the event sink named by `events.sink`.
pub fn connect(config: &EventsConfig) -> AppResult<Arc<dyn EventSink>> {
    match config.sink.as_str() {
        "log" => Ok(Arc::new(LogEventSink::default())),
        #[cfg(feature = "kafka")]
        "kafka" => {
            let sink = KafkaEventSink::new(&config.kafka)?;
            Ok(Arc::new(sink))
        }
        other => Err(AppError::configuration(format!(
            "Unknown event sink '{other}'"
        ))),
    }
}
