//! ScreenScraper.fr web API client.
//!
//! Queries the screenscraper.fr REST-style API for game metadata by file
//! checksum. Lookups run through a three-rung retry ladder that relaxes the
//! identifying information one step per malformed response, and successful
//! raw responses are cached on disk so repeat lookups never touch the
//! network.

mod cache;
mod client;
mod lookup;
pub mod media;
mod systems;

pub use cache::ResponseCache;
pub use client::{Credentials, ScraperClient, XML_PROLOG};
pub use lookup::{strip_release_tags, LookupKey, LookupRequest, Rung};
pub use media::{extract_media, MediaKind, MediaMap};
pub use systems::SYSTEMS_CACHE_FILE;
