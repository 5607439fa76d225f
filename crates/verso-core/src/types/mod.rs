//! Core type definitions used across the Verso workspace.

pub mod id;

pub use id::*;
