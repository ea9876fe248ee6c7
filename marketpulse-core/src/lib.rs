//! MarketPulse Core — data model, providers, fallback synthesis, table logic.
//!
//! This crate contains everything the dashboard needs that isn't a terminal:
//! - Record types for listings, details, and price series
//! - Provider clients for the crypto and equity REST APIs
//! - Fetch-and-fallback: failed fetches degrade to synthetic data + advisory
//! - Table controller (filter + stable single-column sort)
//! - Pagination window with page-link rendering model
//! - Watchlist/seed configuration

pub mod fallback;
pub mod model;
pub mod pager;
pub mod providers;
pub mod table;
pub mod watchlist;
