//! Terminal admin client for pecha metadata.
//!
//! Pechas are fetched from the metadata API, a target pecha is chosen with a
//! searchable selector, and a category from the multilingual category tree
//! is assigned to it.

pub mod api;
pub mod app;
pub mod config;
pub mod models;
pub mod ui;
pub mod utils;
