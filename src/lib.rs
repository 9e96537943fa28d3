//! Romforge - game-library conversion and metadata scraping
//!
//! This library crate exposes the core functionality for integration testing.

pub mod artwork;
pub mod config;
pub mod convert;
pub mod error;
pub mod identity;
pub mod scraper;
