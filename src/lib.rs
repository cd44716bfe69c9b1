//! Newsroll - a single-page news digest
//!
//! Fetches several RSS feeds through an RSS-to-JSON conversion service,
//! merges them into one list sorted by publication date, and serves it
//! with per-source filtering.

pub mod aggregator;
pub mod article;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod render;
pub mod routes;
pub mod sources;
