//! Capability traits defined in `verso-core` and implemented by other crates.
//!
//! Exactly one implementation of each capability is selected from
//! configuration at process startup; business logic only ever sees the
//! trait object. The metadata repository contracts live next to the entity
//! models in `verso-entity`.

pub mod blob_store;
pub mod event_sink;

pub use blob_store::{BlobStore, ByteStream};
pub use event_sink::EventSink;
