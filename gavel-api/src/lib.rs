//! # Gavel API Server Library
//!
//! HTTP surface of the Gavel auction marketplace: listings, bidding,
//! comments, watchlists, categories and sessions.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
