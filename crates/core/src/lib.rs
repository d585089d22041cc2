//! Harper Core - Shared types library.
//!
//! This crate provides common types used across the Harper Insurances
//! components:
//! - `console` - Internal administration console for brokerage staff
//! - `integration-tests` - End-to-end tests against a stub backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Everything
//! that crosses the wire to the brokerage backend is parsed into these types
//! at the boundary, so screens and caches never handle raw strings for
//! identifiers, emails, tax documents, or roles.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, tax documents,
//!   and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
