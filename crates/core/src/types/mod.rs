//! Core types for the Harper Insurances console.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod role;
pub mod tax_id;

pub use email::{Email, EmailError};
pub use id::*;
pub use role::Role;
pub use tax_id::{TaxId, TaxIdError, TaxIdKind};
