//! General-purpose middleware for the API.
//!
//! This module contains the reusable layers applied to the whole Axum router:
//! CORS and request tracing.

use std::time::Duration;

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderName, Method,
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::AUTH_TOKEN_HEADER;
use crate::config::Config;

pub fn cors_layer(config: &Config) -> CorsLayer {
    let origin = match &config.cors_origin {
        Some(origin) => AllowOrigin::exact(origin.clone()),
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(AUTH_TOKEN_HEADER),
        ])
        .max_age(Duration::from_secs(60 * 60))
}

pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}
