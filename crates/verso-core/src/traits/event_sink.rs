//! Event sink trait for fire-and-forget domain event publication.

use async_trait::async_trait;

use crate::events::DomainEvent;

/// Trait for publishing domain events.
///
/// Publication is best-effort: implementations log delivery failures and
/// never surface them to the caller. An operation that has committed its
/// blob and metadata writes is successful whether or not its events land.
#[async_trait]
pub trait EventSink: Send + Sync + std::fmt::Debug + 'static {
    /// Return the sink type name (e.g., "kafka", "log").
    fn sink_type(&self) -> &str;

    /// Publish a single event, swallowing (but logging) failures.
    async fn publish(&self, event: DomainEvent);
}
