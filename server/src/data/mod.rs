//! Data layer: filter compilation and SQLite persistence

pub mod error;
pub mod filters;
pub mod sqlite;

pub use error::DataError;
