//! Domain events emitted by Verso operations.
//!
//! Events are published through the [`EventSink`](crate::traits::EventSink)
//! best-effort; downstream consumers (audit, search indexing, cross-service
//! references) subscribe to the single file-events topic.

pub mod file;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::EventId;

pub use file::FileEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: EventId,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
    /// The event payload; the payload's `type` tag identifies the event.
    pub payload: FileEvent,
}

impl DomainEvent {
    /// Create a new domain event stamped with the current time.
    pub fn new(payload: FileEvent) -> Self {
        Self {
            id: EventId::new(),
            occurred_at: Utc::now(),
            payload,
        }
    }

    /// Partition/routing key: the id of the file the event concerns.
    pub fn partition_key(&self) -> String {
        self.payload.file_id().to_string()
    }
}
