//! Module for user profile and management API endpoints.
//!
//! This module handles functionality related to user information that is
//! distinct from the core authentication process: reading and editing one's
//! own profile, browsing the other side of the marketplace, and account
//! administration.

pub mod handlers;
pub mod routes;
