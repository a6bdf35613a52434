/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login, logout and registration
/// - `listings`: Index, listing creation and the listing page
/// - `categories`: Category browsing and staff administration
/// - `watchlist`: The user's saved listings
/// - `pages`: Page bodies shared by several handlers

pub mod auth;
pub mod categories;
pub mod health;
pub mod listings;
pub mod pages;
pub mod watchlist;
