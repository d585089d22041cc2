//! Harper Insurances console library.
//!
//! This crate provides the staff console as a library, allowing it to be
//! tested end-to-end and reused by the binary in `main.rs`.
//!
//! # Architecture
//!
//! - Axum web framework with askama templates for server-side rendering
//! - A typed `reqwest` client for the brokerage REST backend; the
//!   operator's access token is attached as a bearer header
//! - An in-process query cache with explicit, mutation-driven invalidation
//!   (no TTL, no polling)
//! - Schema-driven form validation and coercion shared by every entity
//!   screen
//! - In-memory sessions behind a session-lifetime cookie

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::{Router, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

pub mod api;
pub mod cache;
pub mod config;
pub mod console;
pub mod error;
pub mod format;
pub mod forms;
pub mod middleware;
pub mod screens;
pub mod session;
pub mod state;

use middleware::create_session_layer;
use state::AppState;

/// Build the console application: routes, session layer, request tracing.
///
/// Sentry layers are added by the binary so tests can run without a Sentry
/// guard.
#[must_use]
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(screens::routes())
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", u64::try_from(latency.as_millis()).unwrap_or(u64::MAX));
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}
