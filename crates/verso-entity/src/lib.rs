//! # verso-entity
//!
//! Domain entity models for Verso. Every struct in this crate represents a
//! database table row; all entities derive `Debug`, `Clone`, `Serialize`,
//! `Deserialize`, and `sqlx::FromRow`. The metadata repository contracts
//! live here next to the models they return.

pub mod file;
