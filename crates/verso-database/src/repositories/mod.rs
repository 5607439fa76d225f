//! Repository implementations for Verso entities.

pub mod file;
pub mod version;

pub use file::PgFileEntryRepository;
pub use version::PgFileVersionRepository;
