//! StudioFit server
//!
//! Filterable listing API for a fitness studio: clients query coaches,
//! lessons, timetables, subscriptions, and attendance through a small
//! filter expression language compiled against per-role allow-lists.

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod utils;
