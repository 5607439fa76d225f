//! # verso-core
//!
//! Core crate for Verso. Contains the capability traits (blob store,
//! metadata repositories, event sink), configuration schemas, typed
//! identifiers, domain events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Verso crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
