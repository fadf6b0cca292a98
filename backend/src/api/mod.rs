//! Central module for organizing the application's main API endpoints.
//!
//! This module acts as a top-level container for the API domains, user
//! profiles and meetings, excluding core authentication routes which are
//! handled separately.

pub mod meeting;
pub mod user;
