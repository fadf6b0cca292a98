//! Module for the meetings API.
//!
//! This module exposes scheduling, listing and the notification feed derived
//! from a user's meetings.

pub mod handlers;
pub mod routes;
