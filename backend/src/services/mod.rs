//! Module for core business logic services.
//!
//! This module encapsulates services that perform specific business operations
//! on data already fetched by the handlers, such as deriving meeting
//! notifications.

pub mod notifications;
