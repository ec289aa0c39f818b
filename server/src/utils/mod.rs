//! Shared utility functions

pub mod sql;
